use super::context::CommentContext;
use super::layer::CommentEngineLayer;
use crate::engine::CommentEngine;
use axum::{
    Router,
    extract::{Path, Request},
    http::{HeaderName, HeaderValue, StatusCode, header::USER_AGENT},
    middleware::{self, Next},
    response::{Html, Response},
    routing::get,
};
use base64::Engine as _;
use commentengine_schema::NewThread;
use rand::RngCore;
use std::time::Instant;
use tower::Layer;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn index_page() -> Html<&'static str> {
    Html(
        "<!doctype html><title>commentengine</title>\
         <p>Visit <code>/posts/{slug}</code> to open a thread, then \
         <code>GET /comments/threads/{slug}</code>.</p>",
    )
}

/// Sample downstream page: asks the engine for a thread keyed by the post slug.
async fn post_page(
    Path(slug): Path<String>,
    ctx: CommentContext,
) -> Result<Html<String>, StatusCode> {
    // Digit-led identifiers address thread ids, so they cannot double as slugs.
    let well_formed = slug.starts_with(|c: char| c.is_ascii_alphabetic())
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !well_formed {
        return Err(StatusCode::NOT_FOUND);
    }

    ctx.create_thread(NewThread::with_slug(slug.clone()));
    Ok(Html(format!(
        "<!doctype html><title>{slug}</title><h1>{slug}</h1>\
         <p>Comments live under this post's thread.</p>"
    )))
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status().as_u16();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if resp.status().is_server_error() {
        error!(status, %request_id, %method, %path, latency_ms, %user_agent, "request failed");
    } else if resp.status().is_client_error() {
        warn!(status, %request_id, %method, %path, latency_ms, %user_agent, "request rejected");
    } else {
        info!(status, %request_id, %method, %path, latency_ms, %user_agent, "request served");
    }

    resp
}

/// Host application: a small downstream site wrapped by the comment engine.
pub fn app_router(engine: CommentEngine) -> Router {
    let site = Router::new()
        .route("/", get(index_page))
        .route("/posts/{slug}", get(post_page))
        .fallback(not_found_handler);

    let service = CommentEngineLayer::new(engine).layer(site);

    Router::new()
        .fallback_service(service)
        .layer(middleware::from_fn(access_log))
}
