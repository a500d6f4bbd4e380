//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use budgie_core::test_utils::{MockModelServer, MockReply};
use budgie_core::{
    Action, GeminiBackend, MockBackend, Phase, PromptLibrary, GENERIC_FAILURE_MESSAGE,
};
use http_body_util::BodyExt;
use std::time::Duration;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    setup_app_with(Some(AIClient::mock()))
}

fn setup_app_with(ai: Option<AIClient>) -> Router {
    let config = ServerConfig {
        allowed_origins: vec![],
    };
    create_router_with_ai(ai, None, config)
}

fn gemini_client(server: &MockModelServer) -> AIClient {
    AIClient::Gemini(
        GeminiBackend::with_host(&server.url(), "test-key", "gemini-test")
            .with_prompts(PromptLibrary::embedded_only()),
    )
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

// ========== Health & Defaults ==========

#[tokio::test]
async fn test_health_with_mock_ai() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["ai_configured"], true);
    assert_eq!(json["ai_healthy"], true);
    assert_eq!(json["ai_backend"], "mock");
    assert_eq!(json["model"], "mock");
}

#[tokio::test]
async fn test_health_without_ai() {
    let app = setup_app_with(None);

    let response = app.oneshot(get("/api/health")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["ai_configured"], false);
    assert_eq!(json["ai_healthy"], false);
    assert!(json["model"].is_null());
}

#[tokio::test]
async fn test_defaults() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/defaults")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["income"], 25000.0);
    assert_eq!(json["rent"], 8000.0);
    assert_eq!(json["luxury"], 500.0);
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

// ========== Session ==========

#[tokio::test]
async fn test_initial_session() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/session")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["can_submit"], true);
    assert_eq!(json["inputs"]["income"], 25000.0);
    assert!(json.get("view").is_none());
    assert!(json.get("message").is_none());
}

#[tokio::test]
async fn test_update_inputs_coerces_values() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "food": "",
        "rent": "₹9,500",
        "luxury": 750,
        "travel": -20,
        "shopping": "lots"
    });
    let response = app
        .oneshot(json_request("PATCH", "/api/session/inputs", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["inputs"]["food"], 0.0);
    assert_eq!(json["inputs"]["rent"], 9500.0);
    assert_eq!(json["inputs"]["luxury"], 750.0);
    assert_eq!(json["inputs"]["travel"], 0.0);
    assert_eq!(json["inputs"]["shopping"], 0.0);
    assert_eq!(json["inputs"]["income"], 25000.0);
}

#[tokio::test]
async fn test_update_inputs_unknown_field() {
    let app = setup_test_app();

    let body = serde_json::json!({ "salary": 100, "rent": 1 });
    let response = app
        .clone()
        .oneshot(json_request("PATCH", "/api/session/inputs", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("salary"));

    // nothing was applied
    let json = get_body_json(app.oneshot(get("/api/session")).await.unwrap()).await;
    assert_eq!(json["inputs"]["rent"], 8000.0);
}

#[tokio::test]
async fn test_update_inputs_rejects_non_scalar() {
    let app = setup_test_app();

    let body = serde_json::json!({ "rent": [1, 2] });
    let response = app
        .oneshot(json_request("PATCH", "/api/session/inputs", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_session_success() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_empty("/api/session/analyze"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["phase"], "ready");
    assert_eq!(json["can_submit"], true);
    assert_eq!(json["view"]["savings_rate"], 16);
    assert_eq!(json["view"]["comparison"][0]["current"], 21000.0);
    assert_eq!(json["view"]["comparison"][0]["predicted"], 22050.0);
    assert_eq!(json["view"]["comparison"][1]["current"], 4000.0);
    assert_eq!(json["view"]["comparison"][1]["predicted"], 2950.0);
    assert_eq!(
        json["view"]["all_clear"],
        "Budget health is excellent. No critical risks found."
    );
    assert!(json["analyzed_at"].is_string());

    // the result stays on the session
    let json = get_body_json(app.oneshot(get("/api/session")).await.unwrap()).await;
    assert_eq!(json["phase"], "ready");
    assert_eq!(json["advice"]["summary"]["savings"], 4000.0);
}

#[tokio::test]
async fn test_analyze_session_failure_is_generic() {
    let app = setup_app_with(Some(AIClient::Mock(MockBackend::failing(
        "API key not valid. Please pass a valid API key.",
    ))));

    let response = app
        .clone()
        .oneshot(post_empty("/api/session/analyze"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], GENERIC_FAILURE_MESSAGE);

    let json = get_body_json(app.oneshot(get("/api/session")).await.unwrap()).await;
    assert_eq!(json["phase"], "failed");
    assert_eq!(json["message"], GENERIC_FAILURE_MESSAGE);
    assert_eq!(json["can_submit"], true);
    assert!(json.get("view").is_none());
}

#[tokio::test]
async fn test_analyze_session_empty_model_reply() {
    let server = MockModelServer::start_with(MockReply::EmptyBody).await;
    let app = setup_app_with(Some(gemini_client(&server)));

    let response = app
        .oneshot(post_empty("/api/session/analyze"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_analyze_session_without_ai() {
    let app = setup_app_with(None);

    let response = app
        .clone()
        .oneshot(post_empty("/api/session/analyze"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // the session was not left loading
    let json = get_body_json(app.oneshot(get("/api/session")).await.unwrap()).await;
    assert_eq!(json["phase"], "idle");
}

#[tokio::test]
async fn test_double_submit_is_rejected_while_pending() {
    let server = MockModelServer::start_with_delay(
        MockReply::Advice(MockBackend::sample_advice()),
        Duration::from_millis(300),
    )
    .await;
    let app = setup_app_with(Some(gemini_client(&server)));

    let first = tokio::spawn(app.clone().oneshot(post_empty("/api/session/analyze")));

    // wait until the first submit has the session loading
    let mut loading = false;
    for _ in 0..50 {
        let json = get_body_json(app.clone().oneshot(get("/api/session")).await.unwrap()).await;
        if json["phase"] == "loading" {
            assert_eq!(json["can_submit"], false);
            loading = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(loading);

    let second = app
        .clone()
        .oneshot(post_empty("/api/session/analyze"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn test_edit_while_pending_is_allowed() {
    let server = MockModelServer::start_with_delay(
        MockReply::Advice(MockBackend::sample_advice()),
        Duration::from_millis(200),
    )
    .await;
    let app = setup_app_with(Some(gemini_client(&server)));

    let first = tokio::spawn(app.clone().oneshot(post_empty("/api/session/analyze")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let body = serde_json::json!({ "income": "40000" });
    let response = app
        .clone()
        .oneshot(json_request("PATCH", "/api/session/inputs", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let first = first.await.unwrap().unwrap();
    let json = get_body_json(first).await;
    assert_eq!(json["inputs"]["income"], 40000.0);

    // the request carried the snapshot taken at submit time
    let sent = server.last_request().unwrap();
    let text = sent.body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(text.contains("Monthly Income: ₹25000"));
}

#[tokio::test]
async fn test_reset_session() {
    let app = setup_test_app();

    let body = serde_json::json!({ "income": 1 });
    app.clone()
        .oneshot(json_request("PATCH", "/api/session/inputs", body))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_empty("/api/session/analyze"))
        .await
        .unwrap();

    let response = app
        .oneshot(post_empty("/api/session/reset"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["inputs"]["income"], 25000.0);
    assert!(json.get("view").is_none());
    assert!(json.get("analyzed_at").is_none());
}

async fn exploding_request() -> Action {
    panic!("backend exploded");
}

#[tokio::test]
async fn test_panicked_analysis_fails_the_session() {
    let state = Arc::new(AppState {
        ai: None,
        session: Mutex::new(Session::default()),
    });
    {
        let mut session = state.session.lock().await;
        let (next, effect) = std::mem::take(&mut *session).update(Action::Submit);
        assert!(effect.is_some());
        *session = next;
    }

    let err = handlers::session::resolve_in_background(state.clone(), exploding_request())
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

    let session = state.session.lock().await;
    assert_eq!(
        session.phase,
        Phase::Failed {
            message: GENERIC_FAILURE_MESSAGE.to_string()
        }
    );
    assert!(session.can_submit());
}

// ========== Stateless analysis ==========

#[tokio::test]
async fn test_stateless_analyze() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "income": 25000, "rent": 8000, "food": 5000, "travel": 2000,
        "loans": 1000, "shopping": 3000, "entertainment": 1500, "luxury": 500
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/analyze", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["savings_rate"], 16);
    assert_eq!(json["allocation"][2]["name"], "Savings");
    assert_eq!(json["allocation"][2]["value"], 4000.0);
    assert_eq!(json["suggestions"][0], "Reduce shopping");

    // the form session is untouched
    let json = get_body_json(app.oneshot(get("/api/session")).await.unwrap()).await;
    assert_eq!(json["phase"], "idle");
}

#[tokio::test]
async fn test_stateless_analyze_failure() {
    let server = MockModelServer::start_with(MockReply::Status(
        403,
        "PERMISSION_DENIED".to_string(),
    ))
    .await;
    let app = setup_app_with(Some(gemini_client(&server)));

    let response = app
        .oneshot(json_request("POST", "/api/analyze", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], GENERIC_FAILURE_MESSAGE);
    assert!(!json.to_string().contains("PERMISSION_DENIED"));
}
