use crate::error::EngineError;
use axum::{
    body::to_bytes,
    extract::Request,
    http::header::CONTENT_TYPE,
};
use commentengine_schema::{CommentParams, CommentSubmission};
use http_body_util::LengthLimitError;
use std::error::Error as StdError;
use tracing::debug;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Collect the `comment` parameter from the query string and the body.
///
/// JSON bodies carry `{"comment": {...}}`; anything else is read as a urlencoded
/// form with `comment[field]` keys. Body values win over query values.
pub(super) async fn comment_params(req: Request) -> Result<CommentParams, EngineError> {
    let from_query = req
        .uri()
        .query()
        .map(|q| params_from_form(q.as_bytes()))
        .unwrap_or_default();

    let is_json = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/json"));

    let bytes = to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            let source = e.into_inner();
            let root: &(dyn StdError + 'static) = &*source;
            let over_limit = std::iter::successors(Some(root), |&e| e.source())
                .any(|e| e.is::<LengthLimitError>());
            if over_limit {
                EngineError::PayloadTooLarge(MAX_BODY_BYTES)
            } else {
                EngineError::BadRequest(format!("failed to read request body: {source}"))
            }
        })?;

    let from_body = if bytes.is_empty() {
        CommentParams::default()
    } else if is_json {
        serde_json::from_slice::<CommentSubmission>(&bytes)
            .map_err(|e| {
                debug!(error = %e, "Rejected comment JSON body");
                EngineError::BadRequest("invalid JSON body".to_string())
            })?
            .comment
            .unwrap_or_default()
    } else {
        params_from_form(&bytes)
    };

    Ok(from_query.merge(from_body))
}

fn params_from_form(input: &[u8]) -> CommentParams {
    let mut params = CommentParams::default();
    for (key, value) in url::form_urlencoded::parse(input) {
        if let Some(field) = key
            .strip_prefix("comment[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            params.set(field, value.into_owned());
        }
    }
    params
}
