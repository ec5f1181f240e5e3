use crate::error::EngineError;
use axum::{extract::FromRequestParts, http::request::Parts};
use commentengine_schema::NewThread;
use std::sync::{Arc, Mutex, PoisonError};

/// Request-scoped handle a downstream handler uses to ask for a new thread.
///
/// The engine layer inserts one into the request extensions before forwarding
/// and reads it back once the downstream response is ready.
#[derive(Debug, Clone, Default)]
pub struct CommentContext {
    signal: Arc<Mutex<Option<NewThread>>>,
}

impl CommentContext {
    /// Request a thread for this response. A later call replaces an earlier one.
    pub fn create_thread(&self, new_thread: NewThread) {
        *self.signal.lock().unwrap_or_else(PoisonError::into_inner) = Some(new_thread);
    }

    pub(crate) fn take(&self) -> Option<NewThread> {
        self.signal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<S> FromRequestParts<S> for CommentContext
where
    S: Send + Sync,
{
    type Rejection = EngineError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CommentContext>()
            .cloned()
            .ok_or(EngineError::ContextMissing)
    }
}
