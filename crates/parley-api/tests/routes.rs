//! Drives the assembled routers end to end with an in-memory credential
//! store and a scripted completion backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use futures_util::future::BoxFuture;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use parley_api::auth::AppStateInner;
use parley_api::completion::{CompletionProvider, UpstreamError};
use parley_api::feed::MessageFeed;
use parley_api::{chat_router, feed_router};
use parley_auth::{AuthService, HashCost, PasswordHasher, TokenIssuer};
use parley_db::Database;

const SECRET: &str = "integration-secret";

#[derive(Default)]
struct ScriptedCompletions {
    calls: AtomicUsize,
    fail: bool,
}

impl CompletionProvider for ScriptedCompletions {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, UpstreamError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(UpstreamError::Status(502))
            } else {
                Ok(format!("reply to {prompt}"))
            }
        })
    }
}

fn app(completions: Arc<ScriptedCompletions>) -> Router {
    let hasher = PasswordHasher::new(HashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let auth = AuthService::new(
        Arc::new(Database::open_in_memory().unwrap()),
        hasher,
        TokenIssuer::new(SECRET),
        chrono::Duration::hours(1),
    );
    chat_router(Arc::new(AppStateInner { auth, completions }))
}

fn post_json(uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/register",
            json!({ "username": username, "password": password }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json_of(&body)["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn ai_without_authorization_is_401_and_skips_upstream() {
    let completions = Arc::new(ScriptedCompletions::default());
    let app = app(completions.clone());

    let (status, body) = send(&app, post_json("/api/ai", json!({ "message": "hi" }), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());
    assert_eq!(completions.calls.load(Ordering::SeqCst), 0);
}

fn post_ai_with_authorization(value: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/ai")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, value)
        .body(Body::from(json!({ "message": "hi" }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn ai_with_header_but_no_token_part_is_401() {
    let completions = Arc::new(ScriptedCompletions::default());
    let app = app(completions.clone());

    for value in ["Bearer", "abc"] {
        let (status, _) = send(&app, post_ai_with_authorization(value)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {value:?}");
    }
    assert_eq!(completions.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ai_with_other_scheme_or_empty_token_is_403() {
    let completions = Arc::new(ScriptedCompletions::default());
    let app = app(completions.clone());

    for value in ["Basic abc", "bearer abc", "Token abc", "Bearer "] {
        let (status, body) = send(&app, post_ai_with_authorization(value)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "header {value:?}");
        assert!(body.is_empty());
    }
    assert_eq!(completions.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ai_with_invalid_token_is_403() {
    let completions = Arc::new(ScriptedCompletions::default());
    let app = app(completions.clone());

    let forged = TokenIssuer::new("some-other-secret")
        .issue("alice", chrono::Duration::hours(1))
        .unwrap();
    for token in ["garbage", forged.as_str()] {
        let (status, body) =
            send(&app, post_json("/api/ai", json!({ "message": "hi" }), Some(token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.is_empty());
    }
    assert_eq!(completions.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ai_with_expired_token_is_403() {
    let completions = Arc::new(ScriptedCompletions::default());
    let app = app(completions.clone());

    let expired = TokenIssuer::new(SECRET)
        .issue("alice", chrono::Duration::seconds(-10))
        .unwrap();
    let (status, _) =
        send(&app, post_json("/api/ai", json!({ "message": "hi" }), Some(&expired))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ai_with_valid_token_returns_reply() {
    let completions = Arc::new(ScriptedCompletions::default());
    let app = app(completions.clone());
    let token = register(&app, "alice", "hunter22").await;

    let (status, body) =
        send(&app, post_json("/api/ai", json!({ "message": "hi" }), Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!({ "reply": "reply to hi" }));
    assert_eq!(completions.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn upstream_failure_is_generic_500() {
    let completions = Arc::new(ScriptedCompletions {
        fail: true,
        ..Default::default()
    });
    let app = app(completions.clone());
    let token = register(&app, "alice", "hunter22").await;

    let (status, body) =
        send(&app, post_json("/api/ai", json!({ "message": "hi" }), Some(&token))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body), json!({ "error": "Failed to get AI response" }));
    assert_eq!(completions.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn login_checks_the_stored_hash() {
    let app = app(Arc::new(ScriptedCompletions::default()));
    register(&app, "alice", "hunter22").await;

    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            json!({ "username": "alice", "password": "hunter22" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json_of(&body);
    assert_eq!(body["username"], "alice");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            json!({ "username": "alice", "password": "password" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(&body), json!({ "error": "invalid credentials" }));
}

#[tokio::test]
async fn login_for_unknown_user_is_rejected() {
    let app = app(Arc::new(ScriptedCompletions::default()));
    let (status, _) = send(
        &app,
        post_json(
            "/auth/login",
            json!({ "username": "ghost", "password": "password" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_conflicts_and_validation() {
    let app = app(Arc::new(ScriptedCompletions::default()));
    register(&app, "alice", "hunter22").await;

    let (status, _) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "username": "alice", "password": "hunter22" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "username": "bob", "password": "short" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feed_lists_messages_in_order() {
    let app = feed_router(MessageFeed::new());

    for (role, text) in [("System", "start"), ("User", "hello"), ("Assistant", "hi")] {
        let (status, _) = send(
            &app,
            post_json(
                "/send_message",
                json!({ "role": role, "text": text, "avatarUrl": "" }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let req = Request::builder()
        .uri("/get_messages")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let list = json_of(&body);
    let texts: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, ["start", "hello", "hi"]);
    assert_eq!(list[0]["role"], "System");
}

#[tokio::test]
async fn feed_rejects_unknown_role() {
    let feed = MessageFeed::new();
    let app = feed_router(feed.clone());

    let (status, _) = send(
        &app,
        post_json("/send_message", json!({ "role": "Narrator", "text": "x" }), None),
    )
    .await;
    assert!(status.is_client_error());
    assert!(feed.is_empty().await);
}
