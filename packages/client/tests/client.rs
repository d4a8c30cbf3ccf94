//! End-to-end tests for the HTTP client.
//!
//! Each test spawns an in-process mock API (real TCP, real HTTP) with axum
//! and drives it through [`Reddit`]. The mock serves both the token endpoint
//! and the API routes, so one base URL stands in for both hosts.
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `fetch_redditor_sends_bearer_and_raw_json` | auth headers, lazy fetch |
//! | `token_is_cached_between_requests` | one token request per lifetime |
//! | `unauthorized_response_refreshes_token_once` | 401 retry |
//! | `info_returns_objectified_listing` | listings through the facade |
//! | `info_rejects_malformed_fullnames_before_sending` | fullname validation |
//! | `error_envelope_on_success_status_is_an_api_error` | error gate on 200 |
//! | `error_envelope_on_bad_status_is_an_api_error` | error gate on 400 |
//! | `plain_bad_status_is_reported_with_body` | 503 without envelope |
//! | `friend_and_unfriend_round_trip` | PUT returns a redditor, DELETE 204 |
//! | `rejected_credentials_fail_with_auth_error` | token endpoint errors |

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use orangered::{Error, Objectified, Thing};
use orangered_client::{ClientConfig, Reddit};
use serde_json::{json, Value};

#[derive(Default)]
struct Mock {
    token_requests: AtomicUsize,
    grants: Mutex<Vec<String>>,
    reject_credentials: bool,
    friend_bodies: Mutex<Vec<Value>>,
}

type Shared = Arc<Mock>;

/// Start a mock API and return `(base_url, state)`.
async fn spawn_mock(reject_credentials: bool) -> (String, Shared) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let state = Arc::new(Mock {
        reject_credentials,
        ..Default::default()
    });
    let router = Router::new()
        .route("/api/v1/access_token", post(token))
        .route("/api/v1/me", get(me))
        .route("/user/{name}/about", get(user_about))
        .route("/api/info", get(info))
        .route("/api/comment", post(comment))
        .route("/api/submit", post(submit))
        .route("/broken", get(broken))
        .route("/api/v1/me/friends/{name}", put(friend).delete(unfriend))
        .with_state(Arc::clone(&state));

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server error");
    });

    (base_url, state)
}

fn client(base: &str) -> Reddit {
    let config = ClientConfig::new("client-id")
        .with_secret("client-secret")
        .with_password("alice", "hunter2")
        .with_urls(base, base);
    Reddit::new(config).expect("build client")
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn token(
    State(state): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    state
        .grants
        .lock()
        .unwrap()
        .push(form.get("grant_type").cloned().unwrap_or_default());
    assert!(headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic ")));
    if state.reject_credentials {
        return Json(json!({ "error": "invalid_grant" }));
    }
    Json(json!({ "access_token": format!("tok-{n}"), "expires_in": 3600, "scope": "*" }))
}

/// Rejects the first token it sees, to exercise the refresh path.
async fn me(headers: HeaderMap) -> Response {
    if bearer(&headers) == Some("tok-1") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "name": "alice", "id": "a1", "link_karma": 3 })).into_response()
}

async fn user_about(
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if bearer(&headers).is_none() || query.get("raw_json").map(String::as_str) != Some("1") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!({
        "kind": "t2",
        "data": { "name": name, "id": "xyz", "link_karma": 42, "comment_karma": 7 }
    }))
    .into_response()
}

async fn info(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let ids = query.get("id").cloned().unwrap_or_default();
    let children: Vec<Value> = ids
        .split(',')
        .filter_map(|fullname| match fullname.split_once('_') {
            Some(("t1", id)) => Some(json!({
                "kind": "t1",
                "data": { "id": id, "author": "bob", "body": "hi", "parent_id": "t3_p" }
            })),
            Some(("t3", id)) => Some(json!({
                "kind": "t3",
                "data": { "id": id, "title": "A post", "author": "[deleted]" }
            })),
            _ => None,
        })
        .collect();
    Json(json!({
        "kind": "Listing",
        "data": { "children": children, "before": null, "after": null }
    }))
}

async fn comment() -> Json<Value> {
    Json(json!({
        "json": { "errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]] }
    }))
}

async fn submit() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "json": { "errors": [["NO_TEXT", "we need something here", "title"]] }
        })),
    )
        .into_response()
}

async fn broken() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response()
}

async fn friend(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.friend_bodies.lock().unwrap().push(body.clone());
    let mut response = json!({ "date": 1.7e9, "id": "t2_b0b", "name": name });
    if let Some(note) = body.get("note") {
        response["note"] = note.clone();
    }
    Json(response)
}

async fn unfriend() -> StatusCode {
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_redditor_sends_bearer_and_raw_json() {
    let (base, state) = spawn_mock(false).await;
    let reddit = client(&base);

    let mut user = reddit.redditor("spez");
    assert!(!user.is_fetched());
    user.fetch().await.unwrap();

    assert!(user.is_fetched());
    assert_eq!(user.data.link_karma, Some(42));
    assert_eq!(user.fullname().as_deref(), Some("t2_xyz"));
    assert_eq!(*state.grants.lock().unwrap(), vec!["password".to_string()]);
}

#[tokio::test]
async fn token_is_cached_between_requests() {
    let (base, state) = spawn_mock(false).await;
    let reddit = client(&base);

    for name in ["a", "b", "c"] {
        let value = reddit.get(&format!("user/{name}/about"), &[]).await.unwrap();
        assert!(matches!(value, Objectified::Thing(Thing::Redditor(_))));
    }
    assert_eq!(state.token_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unauthorized_response_refreshes_token_once() {
    let (base, state) = spawn_mock(false).await;
    let reddit = client(&base);

    let me = reddit.me().await.unwrap();
    assert_eq!(me.name(), "alice");
    assert_eq!(state.token_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn info_returns_objectified_listing() {
    let (base, _state) = spawn_mock(false).await;
    let reddit = client(&base);

    let listing = reddit.info(&["t1_c1", "t3_s1"]).await.unwrap();
    assert_eq!(listing.len(), 2);
    assert!(!listing.has_more());

    let things: Vec<&Thing> = listing.things().collect();
    let comment = things[0].as_comment().expect("first child is a comment");
    assert_eq!(comment.fullname(), "t1_c1");
    assert!(comment.is_root());
    assert_eq!(comment.author().map(|a| a.name().to_string()), Some("bob".into()));

    let submission = things[1].as_submission().expect("second child is a submission");
    assert_eq!(submission.title(), "A post");
    assert!(submission.author().is_none());
}

#[tokio::test]
async fn info_rejects_malformed_fullnames_before_sending() {
    let (base, state) = spawn_mock(false).await;
    let reddit = client(&base);

    let err = reddit.info(&["t1_c1", "not-a-fullname"]).await.unwrap_err();
    assert!(matches!(err, Error::InvalidFullname(_)), "got {err:?}");
    assert_eq!(state.token_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn error_envelope_on_success_status_is_an_api_error() {
    let (base, _state) = spawn_mock(false).await;
    let reddit = client(&base);

    let err = reddit.post("api/comment", &[("text", "hi")]).await.unwrap_err();
    let api = err.as_api_error().expect("server-reported error");
    assert_eq!(api.error_code, "RATELIMIT");
    assert_eq!(api.explanation, "you are doing that too much");
    assert_eq!(api.field.as_deref(), Some("ratelimit"));
}

#[tokio::test]
async fn error_envelope_on_bad_status_is_an_api_error() {
    let (base, _state) = spawn_mock(false).await;
    let reddit = client(&base);

    let err = reddit.post("api/submit", &[]).await.unwrap_err();
    assert_eq!(err.as_api_error().map(|e| e.error_code.as_str()), Some("NO_TEXT"));
}

#[tokio::test]
async fn plain_bad_status_is_reported_with_body() {
    let (base, _state) = spawn_mock(false).await;
    let reddit = client(&base);

    match reddit.get("broken", &[]).await {
        Err(Error::BadStatus { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected BadStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn friend_and_unfriend_round_trip() {
    let (base, state) = spawn_mock(false).await;
    let reddit = client(&base);
    let bob = reddit.redditor("bob");

    let friend = bob.friend(Some("met at the meetup")).await.unwrap();
    assert_eq!(friend.name(), "bob");
    assert_eq!(friend.data.date, Some(1.7e9));
    assert_eq!(friend.fullname().as_deref(), Some("t2_b0b"));
    assert_eq!(friend.data.extra.get("note"), Some(&json!("met at the meetup")));
    bob.friend(None).await.unwrap();
    assert_eq!(
        *state.friend_bodies.lock().unwrap(),
        vec![json!({ "note": "met at the meetup" }), json!({})]
    );

    bob.unfriend().await.unwrap();
}

#[tokio::test]
async fn rejected_credentials_fail_with_auth_error() {
    let (base, _state) = spawn_mock(true).await;
    let reddit = client(&base);

    let err = reddit.redditor("spez").fetch().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "got {err:?}");
}
