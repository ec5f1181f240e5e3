use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Path,
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::Response,
    routing::get,
};
use chrono::{Duration, Utc};
use commentengine::{
    CommentContext, CommentEngine, CommentEngineLayer,
    config::EngineConfig,
    schema::{NewThread, ThreadView},
    server::router::app_router,
};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::{Layer, Service, ServiceExt, limit::ConcurrencyLimit};

static SEQ: AtomicUsize = AtomicUsize::new(0);

struct TestDb {
    path: PathBuf,
}

impl TestDb {
    fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "commentengine-routes-{}-{}-{}.sqlite",
            std::process::id(),
            nanos,
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        Self { path }
    }

    fn config(&self) -> EngineConfig {
        EngineConfig::with_database(format!("sqlite:{}", self.path.display()))
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

/// Downstream site used by the delegate tests.
fn site() -> Router {
    async fn article(Path(slug): Path<String>, ctx: CommentContext) -> &'static str {
        ctx.create_thread(NewThread::with_slug(slug));
        "article"
    }
    async fn plain() -> &'static str {
        "plain"
    }
    Router::new()
        .route("/articles/{slug}", get(article))
        .route("/plain", get(plain))
}

fn wrap(engine: &CommentEngine) -> Router {
    let service = CommentEngineLayer::new(engine.clone()).layer(site());
    Router::new().fallback_service(service)
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("request failed")
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

fn post_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("failed to build request")
}

async fn json_body(resp: Response) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not JSON")
}

const VALID_FORM: &str =
    "comment[author_name]=Ann&comment[author_email]=a%40b.co&comment[body]=Nice+post";

#[tokio::test]
async fn auto_approved_comment_is_listed() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    engine
        .create_thread(NewThread::with_slug("hello"))
        .await
        .unwrap();
    let app = wrap(&engine);

    let resp = send(&app, post_form("/comments/threads/hello/comments", VALID_FORM)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let resp = send(&app, get_req("/comments/threads/hello")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let thread: ThreadView = serde_json::from_value(json_body(resp).await).unwrap();
    assert_eq!(thread.slug.as_deref(), Some("hello"));
    assert!(!thread.closed);
    assert_eq!(thread.comments.len(), 1);
    let c = &thread.comments[0];
    assert_eq!(c.author_name, "Ann");
    assert_eq!(c.author_email, "a@b.co");
    assert_eq!(c.body, "Nice post");
    assert!(!c.created_at.is_empty());
}

#[tokio::test]
async fn unapproved_comment_is_stored_hidden() {
    let db = TestDb::new();
    let cfg = EngineConfig {
        auto_approve: false,
        ..db.config()
    };
    let engine = CommentEngine::new(cfg).unwrap();
    let thread_id = engine
        .create_thread(NewThread::with_slug("hello"))
        .await
        .unwrap();
    let app = wrap(&engine);

    let resp = send(&app, post_form("/comments/threads/hello/comments", VALID_FORM)).await;
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let resp = send(&app, get_req("/comments/threads/hello")).await;
    let body = json_body(resp).await;
    assert_eq!(body["comments"], json!([]));

    let store = engine.store().await.unwrap();
    assert_eq!(store.count_comments(thread_id).await.unwrap(), 1);
}

#[tokio::test]
async fn method_and_path_mismatches() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    engine
        .create_thread(NewThread::with_slug("hello"))
        .await
        .unwrap();
    let app = wrap(&engine);

    let resp = send(&app, get_req("/comments/threads/hello/comments")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = send(&app, post_form("/comments/threads/hello", VALID_FORM)).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = send(
        &app,
        post_form("/comments/threads/doesnotexist/comments", VALID_FORM),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["error"]["code"], "NOT_FOUND");

    for uri in [
        "/comments/threads/doesnotexist",
        "/comments/threads/12345",
        "/comments",
        "/comments/elsewhere",
        "/comments/threads/bad.slug",
    ] {
        let resp = send(&app, get_req(uri)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn thread_is_reachable_by_numeric_id() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    let id = engine.create_thread(NewThread::default()).await.unwrap();
    let app = wrap(&engine);

    let resp = send(&app, get_req(&format!("/comments/threads/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["slug"], Value::Null);
}

#[tokio::test]
async fn blank_body_is_rejected_without_insert() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    let thread_id = engine
        .create_thread(NewThread::with_slug("hello"))
        .await
        .unwrap();
    let app = wrap(&engine);

    let resp = send(
        &app,
        post_form(
            "/comments/threads/hello/comments",
            "comment[author_name]=Ann&comment[author_email]=a%40b.co&comment[body]=+++",
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "body": "cannot be blank" }));

    // Missing `comment` entirely: every required field fails at once.
    let resp = send(&app, post_form("/comments/threads/hello/comments", "")).await;
    assert_eq!(
        json_body(resp).await,
        json!({
            "author_name": "cannot be blank",
            "author_email": "cannot be blank",
            "body": "cannot be blank"
        })
    );

    let store = engine.store().await.unwrap();
    assert_eq!(store.count_comments(thread_id).await.unwrap(), 0);
}

#[tokio::test]
async fn elapsed_auto_close_rejects_comments() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    engine
        .create_thread(
            NewThread::with_slug("old-news").auto_closes_at(Utc::now() - Duration::hours(1)),
        )
        .await
        .unwrap();
    let app = wrap(&engine);

    let resp = send(&app, post_form("/comments/threads/old-news/comments", VALID_FORM)).await;
    assert_eq!(json_body(resp).await, json!({ "thread": "is closed" }));

    let resp = send(&app, get_req("/comments/threads/old-news")).await;
    let body = json_body(resp).await;
    assert_eq!(body["closed"], json!(true));
    assert_eq!(body["comments"], json!([]));
}

#[tokio::test]
async fn future_auto_close_keeps_thread_open() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    engine
        .create_thread(NewThread::with_slug("fresh").auto_closes_at(Utc::now() + Duration::days(1)))
        .await
        .unwrap();
    let app = wrap(&engine);

    let resp = send(&app, post_form("/comments/threads/fresh/comments", VALID_FORM)).await;
    assert_eq!(json_body(resp).await, json!({ "success": true }));
}

#[tokio::test]
async fn email_rules_follow_configuration() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    engine
        .create_thread(NewThread::with_slug("hello"))
        .await
        .unwrap();
    let app = wrap(&engine);

    let resp = send(
        &app,
        post_form(
            "/comments/threads/hello/comments",
            "comment[author_name]=Ann&comment[author_email]=not-an-email&comment[body]=hi",
        ),
    )
    .await;
    assert_eq!(json_body(resp).await, json!({ "author_email": "is not valid" }));

    let relaxed = CommentEngine::new(EngineConfig {
        email_required: false,
        name_required: false,
        ..db.config()
    })
    .unwrap();
    let app = wrap(&relaxed);
    let resp = send(
        &app,
        post_form("/comments/threads/hello/comments", "comment[body]=anonymous"),
    )
    .await;
    assert_eq!(json_body(resp).await, json!({ "success": true }));
}

#[tokio::test]
async fn json_submissions_are_accepted() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    engine
        .create_thread(NewThread::with_slug("hello"))
        .await
        .unwrap();
    let app = wrap(&engine);

    let req = Request::builder()
        .method("POST")
        .uri("/comments/threads/hello/comments")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "comment": { "author_name": " Bo ", "author_email": "bo@x.org", "body": "hey" } })
                .to_string(),
        ))
        .expect("failed to build request");
    let resp = send(&app, req).await;
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let thread = engine.find_thread("hello").await.unwrap();
    assert_eq!(thread.comments[0].author_name, "Bo");

    let req = Request::builder()
        .method("POST")
        .uri("/comments/threads/hello/comments")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{oops"))
        .expect("failed to build request");
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn downstream_signal_creates_thread() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    let app = wrap(&engine);

    let resp = send(&app, get_req("/articles/launch-day")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"article");

    let thread = engine.find_thread("launch-day").await.unwrap();
    assert_eq!(thread.slug.as_deref(), Some("launch-day"));

    // Same slug again: creation fails on the unique index, the page still renders.
    let resp = send(&app, get_req("/articles/launch-day")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // No signal, no thread.
    let resp = send(&app, get_req("/plain")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(engine.find_thread_header("plain").await.unwrap().is_none());
}

#[tokio::test]
async fn storage_failure_is_500_on_api_and_ignored_on_delegate() {
    let engine = CommentEngine::new(EngineConfig::with_database(
        "/nonexistent-commentengine-dir/nested/db.sqlite",
    ))
    .unwrap();
    let app = wrap(&engine);

    let resp = send(&app, get_req("/comments/threads/hello")).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["error"]["code"], "INTERNAL_ERROR");

    let resp = send(&app, get_req("/articles/anything")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_use_shares_one_store() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .create_thread(NewThread::with_slug(format!("post-{i}")))
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.expect("task panicked").expect("create_thread failed"));
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 32);

    for i in [0, 17, 31] {
        let slug = format!("post-{i}");
        let header = engine.find_thread_header(&slug).await.unwrap();
        assert_eq!(header.and_then(|h| h.slug).as_deref(), Some(slug.as_str()));
    }
}

#[tokio::test]
async fn failed_store_start_is_retried() {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "commentengine-retry-{}-{}",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    let engine = CommentEngine::new(EngineConfig::with_database(
        dir.join("db.sqlite").display().to_string(),
    ))
    .unwrap();

    assert!(engine.find_thread_header("hello").await.is_err());

    std::fs::create_dir_all(&dir).expect("failed to create db dir");
    assert!(engine.find_thread_header("hello").await.unwrap().is_none());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn oversized_submission_is_413() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    engine
        .create_thread(NewThread::with_slug("hello"))
        .await
        .unwrap();
    let app = wrap(&engine);

    let huge = format!("{VALID_FORM}&comment[body]={}", "a".repeat(128 * 1024));
    let resp = send(&app, post_form("/comments/threads/hello/comments", &huge)).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(resp).await["error"]["code"], "PAYLOAD_TOO_LARGE");

    let thread = engine.find_thread("hello").await.unwrap();
    assert!(thread.comments.is_empty());
}

#[tokio::test]
async fn api_requests_release_downstream_capacity() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    let mut svc = CommentEngineLayer::new(engine).layer(ConcurrencyLimit::new(site(), 1));

    let resp = ServiceExt::<Request<Body>>::ready(&mut svc)
        .await
        .unwrap()
        .call(get_req("/comments/threads/missing"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // A sibling clone only gets the single permit if the API call gave it back.
    let mut sibling = svc.clone();
    tokio::time::timeout(
        std::time::Duration::from_secs(2),
        ServiceExt::<Request<Body>>::ready(&mut sibling),
    )
    .await
    .expect("downstream capacity was never released")
    .unwrap();
    let resp = sibling.call(get_req("/plain")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn context_extractor_requires_the_layer() {
    let unwrapped = site();
    let resp = send(&unwrapped, get_req("/articles/nope")).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn custom_base_is_honored() {
    let db = TestDb::new();
    let engine = CommentEngine::new(EngineConfig {
        base: "/api/talk/".to_string(),
        ..db.config()
    })
    .unwrap();
    engine
        .create_thread(NewThread::with_slug("hello"))
        .await
        .unwrap();
    let app = wrap(&engine);

    let resp = send(&app, get_req("/api/talk/threads/hello")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Outside the base the downstream router answers (and has no such route).
    let resp = send(&app, get_req("/comments/threads/hello")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn bundled_app_wires_posts_to_threads() {
    let db = TestDb::new();
    let engine = CommentEngine::new(db.config()).unwrap();
    let app = app_router(engine.clone());

    let resp = send(&app, get_req("/posts/first-post")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = send(
        &app,
        post_form("/comments/threads/first-post/comments", VALID_FORM),
    )
    .await;
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let resp = send(&app, get_req("/comments/threads/first-post")).await;
    let body = json_body(resp).await;
    assert_eq!(body["comments"].as_array().map(Vec::len), Some(1));

    let resp = send(&app, get_req("/posts/%3Cscript%3E")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, get_req("/posts/Release-Notes")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&app, get_req("/comments/threads/Release-Notes")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["slug"], "Release-Notes");

    let resp = send(&app, get_req("/posts/9-lives")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
