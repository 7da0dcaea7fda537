use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use goalshare_core::auth::LoginCodeSenderTrait;
use goalshare_server::{
    api::app_router, build_state_with_sender, config::Config, scheduler::run_retention,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSender {
    fn last_code_for(&self, email: &str) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
            .expect("no code sent")
    }
}

#[async_trait]
impl LoginCodeSenderTrait for RecordingSender {
    async fn send_code(&self, email: &str, code: &str) -> goalshare_core::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    sender: Arc<RecordingSender>,
    state: Arc<goalshare_server::AppState>,
    _dir: TempDir,
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: dir.path().join("test.db").to_string_lossy().into_owned(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        secret_key: BASE64.encode([42u8; 32]),
        session_ttl: Duration::from_secs(3600),
        cookie_secure: false,
        analytics_retention_days: 90,
        retention_interval: Duration::from_secs(3600),
    }
}

async fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let sender = Arc::new(RecordingSender::default());
    let state = build_state_with_sender(&config, sender.clone())
        .await
        .unwrap();
    TestApp {
        router: app_router(state.clone(), &config),
        sender,
        state,
        _dir: dir,
    }
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Signs in through the code flow and returns (access token, set-cookie header, user json).
async fn sign_in(app: &TestApp, email: &str) -> (String, String, Value) {
    let response = send(
        app,
        Method::POST,
        "/api/v1/auth/request-code",
        None,
        Some(json!({ "email": email })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let code = app.sender.last_code_for(email);
    let response = send(
        app,
        Method::POST,
        "/api/v1/auth/verify-code",
        None,
        Some(json!({ "email": email, "code": code })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = json_body(response).await;
    let token = body["accessToken"].as_str().unwrap().to_string();
    (token, cookie, body["user"].clone())
}

fn goal_payload() -> Value {
    json!({
        "title": "Holiday",
        "targetAmount": 12000.0,
        "targetDate": "2035-06-01T00:00:00Z",
        "expectedRate": 5.0,
        "compounding": "monthly",
        "contributionFrequency": "monthly",
        "existingSavings": 2000.0
    })
}

#[tokio::test]
async fn health_endpoints_are_public() {
    let app = build_test_app().await;
    let response = send(&app, Method::GET, "/api/v1/healthz", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let response = send(&app, Method::GET, "/api/v1/readyz", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = build_test_app().await;
    let response = send(&app, Method::GET, "/api/v1/goals", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert!(body["message"].is_string());

    let response = send(&app, Method::GET, "/api/v1/me", Some("not-a-token"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_code_flow_sets_session_cookie() {
    let app = build_test_app().await;
    let (_, cookie, user) = sign_in(&app, "Alice@Example.com").await;
    assert_eq!(user["email"], "alice@example.com");
    assert!(cookie.starts_with("goalshare_session="));
    assert!(cookie.contains("HttpOnly"));

    let session = cookie.split(';').next().unwrap().to_string();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .header(header::COOKIE, session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = json_body(response).await;
    assert_eq!(me["email"], "alice@example.com");
    assert!(me["lastLoginAt"].is_string());

    let response = send(&app, Method::POST, "/api/v1/auth/logout", None, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response.headers().get(header::SET_COOKIE).unwrap();
    assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn wrong_code_is_rejected() {
    let app = build_test_app().await;
    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/request-code",
        None,
        Some(json!({ "email": "carol@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let code = app.sender.last_code_for("carol@example.com");
    let wrong = if code == "000000" { "111111" } else { "000000" };
    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/verify-code",
        None,
        Some(json!({ "email": "carol@example.com", "code": wrong })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/request-code",
        None,
        Some(json!({ "email": "not an email" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_name_can_be_updated() {
    let app = build_test_app().await;
    let (token, _, _) = sign_in(&app, "alice@example.com").await;

    let response = send(
        &app,
        Method::PUT,
        "/api/v1/me",
        Some(token.as_str()),
        Some(json!({ "name": "Alice" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["name"], "Alice");
}

#[tokio::test]
async fn shared_goal_lifecycle() {
    let app = build_test_app().await;
    let (alice, _, _) = sign_in(&app, "alice@example.com").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(alice.as_str()),
        Some(goal_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let goal = json_body(response).await;
    let goal_id = goal["id"].as_str().unwrap().to_string();
    assert_eq!(goal["members"][0]["role"], "owner");
    assert_eq!(goal["members"][0]["splitPercent"], 100.0);

    let response = send(&app, Method::GET, "/api/v1/goals", Some(alice.as_str()), None).await;
    let summaries = json_body(response).await;
    assert_eq!(summaries.as_array().unwrap().len(), 1);
    assert_eq!(summaries[0]["goalId"], goal_id.as_str());
    assert_eq!(summaries[0]["memberCount"], 1);

    let plan_uri = format!("/api/v1/goals/{goal_id}/plan");
    let response = send(&app, Method::GET, &plan_uri, Some(alice.as_str()), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let plan = json_body(response).await;
    assert!(plan["totals"]["perPeriod"].as_f64().unwrap() > 0.0);
    assert_eq!(plan["horizon"]["nPerYear"], 12);

    // Invite bob before he has ever signed in.
    let members_uri = format!("/api/v1/goals/{goal_id}/members");
    let response = send(
        &app,
        Method::POST,
        &members_uri,
        Some(alice.as_str()),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let goal = json_body(response).await;
    assert_eq!(goal["members"].as_array().unwrap().len(), 2);
    assert_eq!(goal["members"][1]["email"], "bob@example.com");
    let bob_id = goal["members"][1]["userId"].as_str().unwrap().to_string();

    let response = send(
        &app,
        Method::POST,
        &members_uri,
        Some(alice.as_str()),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        Method::PUT,
        &format!("{members_uri}/splits"),
        Some(alice.as_str()),
        Some(json!([
            { "userId": goal["members"][0]["userId"], "splitPercent": 60.0 },
            { "userId": bob_id, "splitPercent": 40.0 }
        ])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (bob, _, bob_user) = sign_in(&app, "bob@example.com").await;
    assert_eq!(bob_user["id"], bob_id.as_str());

    let goal_uri = format!("/api/v1/goals/{goal_id}");
    let response = send(&app, Method::GET, &goal_uri, Some(bob.as_str()), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, Method::GET, &plan_uri, Some(bob.as_str()), None).await;
    let plan = json_body(response).await;
    let total = plan["totals"]["perPeriod"].as_f64().unwrap();
    let bob_share = plan["members"][1]["perPeriod"].as_f64().unwrap();
    assert!((bob_share - total * 0.4).abs() < 1e-6);

    let response = send(
        &app,
        Method::PUT,
        &goal_uri,
        Some(bob.as_str()),
        Some(goal_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = send(&app, Method::DELETE, &goal_uri, Some(bob.as_str()), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (carol, _, _) = sign_in(&app, "carol@example.com").await;
    let response = send(&app, Method::GET, &goal_uri, Some(carol.as_str()), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        Method::POST,
        &format!("{goal_uri}/leave"),
        Some(bob.as_str()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = send(&app, Method::GET, "/api/v1/goals", Some(bob.as_str()), None).await;
    assert!(json_body(response).await.as_array().unwrap().is_empty());

    let response = send(&app, Method::DELETE, &goal_uri, Some(alice.as_str()), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = send(&app, Method::GET, &goal_uri, Some(alice.as_str()), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_goal_is_rejected() {
    let app = build_test_app().await;
    let (alice, _, _) = sign_in(&app, "alice@example.com").await;

    let mut payload = goal_payload();
    payload["title"] = json!("   ");
    let response = send(&app, Method::POST, "/api/v1/goals", Some(alice.as_str()), Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analytics_events_are_accepted_and_retained() {
    let app = build_test_app().await;
    let response = send(
        &app,
        Method::POST,
        "/api/v1/analytics/events",
        None,
        Some(json!({ "name": "page_view", "path": "/goals" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let (alice, _, _) = sign_in(&app, "alice@example.com").await;
    let response = send(
        &app,
        Method::POST,
        "/api/v1/analytics/events",
        Some(alice.as_str()),
        Some(json!({ "name": "goal_created", "properties": { "members": 1 } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/analytics/events",
        None,
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Fresh events are inside the retention window; only the consumed login code goes.
    let (events, codes) = run_retention(&app.state).await;
    assert_eq!(events, 0);
    assert_eq!(codes, 1);
}
