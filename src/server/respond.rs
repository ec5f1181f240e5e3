use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use commentengine_schema::{FieldErrors, SuccessBody, ThreadView};

pub(super) fn thread(view: ThreadView) -> Response {
    (StatusCode::OK, Json(view)).into_response()
}

pub(super) fn success() -> Response {
    (StatusCode::OK, Json(SuccessBody::default())).into_response()
}

/// Validation failures are reported with 200 and a field -> message map.
pub(super) fn field_errors(errors: FieldErrors) -> Response {
    (StatusCode::OK, Json(errors)).into_response()
}
