use super::context::CommentContext;
use super::handlers;
use crate::engine::CommentEngine;
use axum::{extract::Request, response::Response};
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Claims every path starting with the engine's base; forwards the rest.
#[derive(Clone)]
pub struct CommentEngineLayer {
    engine: CommentEngine,
}

impl CommentEngineLayer {
    pub fn new(engine: CommentEngine) -> Self {
        Self { engine }
    }
}

impl<S> Layer<S> for CommentEngineLayer {
    type Service = CommentEngineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CommentEngineService {
            inner,
            engine: self.engine.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CommentEngineService<S> {
    inner: S,
    engine: CommentEngine,
}

impl<S> Service<Request> for CommentEngineService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let engine = self.engine.clone();

        if let Some(rest) = req.uri().path().strip_prefix(engine.base()) {
            let rest = rest.to_string();
            // `inner` is not called here; drop it to release whatever poll_ready reserved.
            let fresh = self.inner.clone();
            drop(std::mem::replace(&mut self.inner, fresh));
            return Box::pin(async move { Ok(handlers::dispatch(&engine, &rest, req).await) });
        }

        // Take the service that was driven to readiness; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let ctx = CommentContext::default();
        req.extensions_mut().insert(ctx.clone());

        Box::pin(async move {
            let resp = inner.call(req).await?;

            if let Some(new_thread) = ctx.take() {
                match engine.create_thread(new_thread).await {
                    Ok(id) => debug!(thread.id = id, "Thread created from downstream signal"),
                    Err(e) => warn!(error = %e, "Thread creation from downstream signal failed"),
                }
            }

            Ok(resp)
        })
    }
}
