use super::dispatch::{Endpoint, RouteMatch, match_route};
use super::{extract, respond};
use crate::engine::{CommentEngine, CommentOutcome};
use crate::error::EngineError;
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Serve a request whose path is under the engine's base; `path` has the base stripped.
pub(super) async fn dispatch(engine: &CommentEngine, path: &str, req: Request) -> Response {
    match match_route(req.method(), path) {
        RouteMatch::NotFound => EngineError::NotFound.into_response(),
        RouteMatch::MethodNotAllowed => EngineError::MethodNotAllowed.into_response(),
        RouteMatch::Matched(Endpoint::FindThread, id) => find_thread(engine, id).await.into_response(),
        RouteMatch::Matched(Endpoint::CreateComment, id) => {
            create_comment(engine, id, req).await.into_response()
        }
    }
}

async fn find_thread(engine: &CommentEngine, id: &str) -> Result<Response, EngineError> {
    let view = engine.find_thread(id).await?;
    debug!(
        thread.id = view.id,
        comments = view.comments.len(),
        "Thread fetched"
    );
    Ok(respond::thread(view))
}

async fn create_comment(
    engine: &CommentEngine,
    id: &str,
    req: Request,
) -> Result<Response, EngineError> {
    let params = extract::comment_params(req).await?;

    match engine.create_comment(id, params).await? {
        CommentOutcome::Created { id: comment_id } => {
            debug!(thread = %id, comment.id = comment_id, "Comment accepted");
            Ok(respond::success())
        }
        CommentOutcome::Rejected(errors) => Ok(respond::field_errors(errors)),
    }
}
