//! Integration tests for budgie-core
//!
//! These tests exercise the full edit → submit → request → render workflow
//! against a mock model server.

use std::time::Duration;

use budgie_core::{
    ai::AdvisorBackend,
    session::{perform, run_submit},
    test_utils::{MockModelServer, MockReply},
    Action, BudgetField, BudgetInputs, Effect, Error, GeminiBackend, MockBackend,
    OpenAICompatibleBackend, Phase, PromptLibrary, Session, GENERIC_FAILURE_MESSAGE,
};

fn backend_for(server: &MockModelServer) -> GeminiBackend {
    GeminiBackend::with_host(&server.url(), "test-key", "gemini-test")
        .with_prompts(PromptLibrary::embedded_only())
}

fn chat_backend_for(server: &MockModelServer) -> OpenAICompatibleBackend {
    OpenAICompatibleBackend::with_api_key(&server.url(), "gpt-test", "sk-test")
        .with_prompts(PromptLibrary::embedded_only())
}

// =============================================================================
// Advisory client
// =============================================================================

#[tokio::test]
async fn test_advise_round_trip() {
    let server = MockModelServer::start().await;
    let backend = backend_for(&server);

    let advice = backend
        .advise(&BudgetInputs::default())
        .await
        .expect("advice");

    assert_eq!(advice, MockBackend::sample_advice());
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn test_request_carries_prompt_schema_and_key() {
    let server = MockModelServer::start().await;
    let backend = backend_for(&server);

    let inputs = BudgetInputs::default().with(BudgetField::Luxury, 1234.0);
    backend.advise(&inputs).await.expect("advice");

    let request = server.last_request().expect("captured request");
    assert_eq!(request.call, "gemini-test:generateContent");
    assert_eq!(request.api_key.as_deref(), Some("test-key"));

    let user_text = request.body["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("user text");
    assert!(user_text.contains("Monthly Income: ₹25000"));
    assert!(user_text.contains("Luxury: ₹1234"));

    let config = &request.body["generationConfig"];
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["responseSchema"]["type"], "OBJECT");
    assert!(config["responseSchema"]["properties"]["next_month_prediction"].is_object());
    assert!(request.body["systemInstruction"]["parts"][0]["text"].is_string());
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let server = MockModelServer::start_with(MockReply::Status(
        401,
        r#"{"error": {"code": 401, "message": "API key not valid"}}"#.to_string(),
    ))
    .await;

    let err = backend_for(&server)
        .advise(&BudgetInputs::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth { status: 401, .. }));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let server =
        MockModelServer::start_with(MockReply::Status(503, "overloaded".to_string())).await;

    let err = backend_for(&server)
        .advise(&BudgetInputs::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 503, .. }));
    assert_eq!(server.request_count(), 1, "no retry");
}

#[tokio::test]
async fn test_empty_replies_are_errors() {
    for reply in [
        MockReply::Text(String::new()),
        MockReply::EmptyBody,
        MockReply::NoCandidates,
    ] {
        let server = MockModelServer::start_with(reply.clone()).await;
        let err = backend_for(&server)
            .advise(&BudgetInputs::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::EmptyResponse),
            "{:?} gave {:?}",
            reply,
            err
        );
    }
}

#[tokio::test]
async fn test_incomplete_advice_is_rejected() {
    let server = MockModelServer::start_with(MockReply::Text("{}".to_string())).await;
    let err = backend_for(&server)
        .advise(&BudgetInputs::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[tokio::test]
async fn test_health_check_against_mock() {
    let server = MockModelServer::start().await;
    assert!(backend_for(&server).health_check().await);
    assert_eq!(server.request_count(), 0);
}

// =============================================================================
// OpenAI-compatible client
// =============================================================================

#[tokio::test]
async fn test_chat_advise_round_trip() {
    let server = MockModelServer::start().await;
    let backend = chat_backend_for(&server);

    let advice = backend
        .advise(&BudgetInputs::default())
        .await
        .expect("advice");

    assert_eq!(advice, MockBackend::sample_advice());
    assert_eq!(server.request_count(), 1);

    let request = server.last_request().expect("captured request");
    assert_eq!(request.call, "chat/completions");
    assert_eq!(request.api_key.as_deref(), Some("sk-test"));
    assert_eq!(request.body["model"], "gpt-test");
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert!(request.body["messages"][1]["content"]
        .as_str()
        .expect("user content")
        .contains("Monthly Income: ₹25000"));
    assert_eq!(
        request.body["response_format"]["json_schema"]["name"],
        "budget_advice"
    );
}

#[tokio::test]
async fn test_chat_status_mapping() {
    for (status, expect_auth) in [(401, true), (403, true), (429, false), (500, false)] {
        let server =
            MockModelServer::start_with(MockReply::Status(status, "nope".to_string())).await;
        let err = chat_backend_for(&server)
            .advise(&BudgetInputs::default())
            .await
            .unwrap_err();

        if expect_auth {
            assert!(
                matches!(err, Error::Auth { status: s, .. } if s == status),
                "{} gave {:?}",
                status,
                err
            );
        } else {
            assert!(
                matches!(err, Error::Api { status: s, .. } if s == status),
                "{} gave {:?}",
                status,
                err
            );
        }
        assert_eq!(server.request_count(), 1, "no retry");
    }
}

#[tokio::test]
async fn test_chat_empty_replies_are_errors() {
    for reply in [
        MockReply::Text(String::new()),
        MockReply::Text("  \n".to_string()),
        MockReply::EmptyBody,
        MockReply::NoCandidates,
    ] {
        let server = MockModelServer::start_with(reply.clone()).await;
        let err = chat_backend_for(&server)
            .advise(&BudgetInputs::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::EmptyResponse),
            "{:?} gave {:?}",
            reply,
            err
        );
    }
}

#[tokio::test]
async fn test_chat_health_check_against_mock() {
    let server = MockModelServer::start().await;
    assert!(chat_backend_for(&server).health_check().await);
    assert_eq!(server.request_count(), 0);
}

// =============================================================================
// Session workflow
// =============================================================================

#[tokio::test]
async fn test_scenario_end_to_end() {
    let server = MockModelServer::start().await;
    let backend = backend_for(&server);

    let session = Session::default();
    let session = run_submit(session, &backend).await;

    let view = session.view().expect("result panel");
    assert_eq!(view.savings_rate, 16);
    assert_eq!(view.comparison[0].current, 21000.0);
    assert_eq!(view.comparison[0].predicted, 22050.0);
    assert_eq!(view.comparison[1].current, 4000.0);
    assert_eq!(view.comparison[1].predicted, 2950.0);
    assert!(session.analyzed_at.is_some());
}

#[tokio::test]
async fn test_failed_response_reaches_error_state() {
    let server = MockModelServer::start_with(MockReply::EmptyBody).await;
    let backend = backend_for(&server);

    // a successful run first, so there is something stale to hide
    let session = run_submit(Session::default(), &MockBackend::new()).await;
    assert!(session.view().is_some());

    let session = run_submit(session, &backend).await;
    assert_eq!(
        session.phase,
        Phase::Failed {
            message: GENERIC_FAILURE_MESSAGE.to_string()
        }
    );
    assert!(session.view().is_none());
}

#[tokio::test]
async fn test_double_submit_issues_one_request() {
    let server = MockModelServer::start_with_delay(
        MockReply::Advice(MockBackend::sample_advice()),
        Duration::from_millis(200),
    )
    .await;
    let backend = backend_for(&server);

    let (session, first) = Session::default().update(Action::Submit);
    let Some(effect @ Effect::RequestAdvice(_)) = first else {
        panic!("first submit should request advice");
    };

    let pending = tokio::spawn({
        let backend = backend.clone();
        async move { perform(effect, &backend).await }
    });

    let (session, second) = session.update(Action::Submit);
    assert!(second.is_none());

    let action = pending.await.expect("request task");
    let (session, _) = session.update(action);

    assert_eq!(server.request_count(), 1);
    assert!(session.view().is_some());
}
