//! HTTP analysis client against a mock endpoint

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use lead_capture::client::{AnalysisClient, HttpAnalysisClient};
use lead_capture::config::Config;
use lead_capture::cookie::CookieJar;
use lead_capture::error::AnalysisError;
use lead_capture::submission::{
    SubmissionAction, SubmissionEnvironment, SubmissionReducer, SubmissionState,
};
use lead_capture::types::AnalysisRequest;
use lead_capture::view::{MemoryView, Slot, ViewBinding};
use lead_capture_core::environment::SystemClock;
use lead_capture_runtime::Store;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANALYZE_PATH: &str = "/api/analyze-email";

fn client_for(server: &MockServer) -> HttpAnalysisClient {
    HttpAnalysisClient::new(format!("{}{ANALYZE_PATH}", server.uri()))
}

fn request() -> AnalysisRequest {
    AnalysisRequest::from_input(" jane@acme.io ").unwrap()
}

#[tokio::test]
async fn posts_json_with_csrf_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(header("content-type", "application/json"))
        .and(header("X-CSRFToken", "tok-123"))
        .and(body_json(json!({ "email": "jane@acme.io" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "company_domain": "acme.io",
            "linkedin_profile": "https://linkedin.com/company/acme",
            "cheat_sheet_bullets": "One|Two"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .analyze(request(), "tok-123".to_string())
        .await
        .unwrap();

    assert_eq!(response.company_domain, "acme.io");
    assert_eq!(response.cheat_sheet_bullets.as_deref(), Some("One|Two"));
}

#[tokio::test]
async fn missing_token_sends_empty_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists("X-CSRFToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "company_domain": "acme.io" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).analyze(request(), String::new()).await;
    assert!(response.is_ok());
}

#[tokio::test]
async fn server_error_carries_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid email domain" })),
        )
        .mount(&server)
        .await;

    let error = client_for(&server)
        .analyze(request(), String::new())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        AnalysisError::Server {
            status: 400,
            message: Some("Invalid email domain".to_string()),
        }
    );
    assert_eq!(error.user_message(), "Invalid email domain");
}

#[tokio::test]
async fn server_error_without_json_body_has_no_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .analyze(request(), String::new())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        AnalysisError::Server {
            status: 502,
            message: None,
        }
    );
}

#[tokio::test]
async fn success_without_domain_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "linkedin_profile": null })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .analyze(request(), String::new())
        .await
        .unwrap_err();

    assert!(matches!(error, AnalysisError::Parse(_)));
}

#[tokio::test]
async fn lenient_mode_recovers_wrapped_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "Here is the analysis:\n```json\n{\"company_domain\": \"acme.io\"}\n```",
        ))
        .mount(&server)
        .await;

    let strict = client_for(&server).analyze(request(), String::new()).await;
    assert!(matches!(strict, Err(AnalysisError::Parse(_))));

    let lenient = client_for(&server)
        .lenient(true)
        .analyze(request(), String::new())
        .await
        .unwrap();
    assert_eq!(lenient.company_domain, "acme.io");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}{ANALYZE_PATH}", listener.local_addr().unwrap());
    drop(listener);

    let error = HttpAnalysisClient::new(url)
        .analyze(request(), String::new())
        .await
        .unwrap_err();

    assert!(matches!(error, AnalysisError::Transport(_)));
}

#[tokio::test]
async fn store_renders_http_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(header("X-CSRFToken", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "company_domain": "https://www.acme-corp.io",
            "cheat_sheet_bullets": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::from_lookup(|key| match key {
        "LEAD_CAPTURE_BASE_URL" => Some(server.uri()),
        _ => None,
    })
    .unwrap();

    let view = Arc::new(MemoryView::new());
    view.set_value(Slot::EmailInput, "jane@acme-corp.io");
    let env = SubmissionEnvironment::new(
        view.clone(),
        Arc::new(CookieJar::new("csrf_token=abc")),
        Arc::new(HttpAnalysisClient::from_config(&config).unwrap()),
        Arc::new(SystemClock),
    );
    let store = Store::new(SubmissionState::new(), SubmissionReducer::new(), env);

    store
        .send_and_wait_for(
            SubmissionAction::Submit,
            SubmissionAction::is_terminal,
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    store.wait_for_idle().await;

    assert_eq!(view.text(Slot::CompanyName), "Acme Corp");
    assert_eq!(
        view.href(Slot::WebsiteLink).as_deref(),
        Some("https://www.acme-corp.io")
    );
    assert_eq!(view.items(Slot::TopicList), vec!["No topics available"]);
    assert!(!view.is_visible(Slot::ProfileLink));

    store.shutdown(Duration::from_secs(1)).await.unwrap();
}
