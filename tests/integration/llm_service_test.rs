// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use lunchrs::domain::models::extraction::ExtractionTask;
use lunchrs::domain::models::restaurant::RestaurantContext;
use lunchrs::domain::services::credential_provider::CredentialProvider;
use lunchrs::domain::services::llm_service::{ExtractionClient, LLMService};
use lunchrs::domain::services::request_builder::RequestBuilder;
use lunchrs::utils::errors::ExtractionError;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::{llm_service, responses_body, TEST_API_KEY, TEST_MODEL, VALID_CSV};

fn html_request() -> lunchrs::domain::models::extraction::ExtractionRequest {
    let context = RestaurantContext::new(
        "pagoden".to_string(),
        "https://pagoden.example/lunch".to_string(),
        "Göteborg".to_string(),
        "Centrum".to_string(),
    );
    RequestBuilder::new(TEST_MODEL)
        .build(
            &ExtractionTask::Html("Dagens lunch Måndag Fiskgratäng 129 kr".to_string()),
            &context,
        )
        .unwrap()
}

#[tokio::test]
async fn test_extract_sends_bearer_request_to_responses_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses_body(VALID_CSV)))
        .expect(1)
        .mount(&server)
        .await;

    let service = llm_service(&server.uri(), Duration::from_secs(5));
    let text = service.extract(&html_request()).await.unwrap();

    assert_eq!(text, VALID_CSV.trim());

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], TEST_MODEL);
    assert_eq!(body["max_output_tokens"], 2000);
    assert_eq!(body["metadata"]["task"], "html");
    assert_eq!(body["metadata"]["restaurant_id"], "pagoden");
    assert!(body.get("temperature").is_none());
    assert!(body.get("top_p").is_none());
}

#[tokio::test]
async fn test_extract_accepts_each_response_shape() {
    let shapes = [
        json!({ "output_text": VALID_CSV }),
        json!({ "text": VALID_CSV }),
        json!({ "output": [{ "text": VALID_CSV }] }),
        json!({ "choices": [{ "message": { "content": VALID_CSV } }] }),
    ];

    for shape in shapes {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(shape.clone()))
            .mount(&server)
            .await;

        let service = llm_service(&server.uri(), Duration::from_secs(5));
        let text = service.extract(&html_request()).await.unwrap();
        assert_eq!(text, VALID_CSV.trim(), "shape {}", shape);
    }
}

#[tokio::test]
async fn test_extract_strips_markdown_fences() {
    let server = MockServer::start().await;
    let fenced = format!("```csv\n{}```", VALID_CSV);
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output_text": fenced })))
        .mount(&server)
        .await;

    let service = llm_service(&server.uri(), Duration::from_secs(5));
    let text = service.extract(&html_request()).await.unwrap();
    assert!(text.starts_with("day,lunch,price,tags"));
    assert!(!text.contains("```"));
}

#[tokio::test]
async fn test_extract_maps_rejected_credentials_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let service = llm_service(&server.uri(), Duration::from_secs(5));
    let err = service.extract(&html_request()).await.unwrap_err();

    match err {
        ExtractionError::Auth { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_extract_maps_server_error_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let service = llm_service(&server.uri(), Duration::from_secs(5));
    let err = service.extract(&html_request()).await.unwrap_err();

    assert!(matches!(
        err,
        ExtractionError::Transport {
            status: Some(500),
            ..
        }
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_extract_times_out_as_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(responses_body(VALID_CSV))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let service = llm_service(&server.uri(), Duration::from_secs(1));
    let err = service.extract(&html_request()).await.unwrap_err();

    assert!(matches!(err, ExtractionError::Transport { status: None, .. }));
}

#[tokio::test]
async fn test_extract_reports_keys_when_text_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "resp_1", "status": "incomplete", "output": [] })),
        )
        .mount(&server)
        .await;

    let service = llm_service(&server.uri(), Duration::from_secs(5));
    let err = service.extract(&html_request()).await.unwrap_err();

    match err {
        ExtractionError::ResponseMalformed { keys } => {
            assert_eq!(keys, vec!["id", "output", "status"]);
        }
        other => panic!("expected malformed response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses_body(VALID_CSV)))
        .expect(0)
        .mount(&server)
        .await;

    let service = LLMService::new(
        &server.uri(),
        Duration::from_secs(5),
        Arc::new(CredentialProvider::new(None, None, None)),
    )
    .unwrap();

    let err = service.ensure_credentials().await.unwrap_err();
    assert!(matches!(err, ExtractionError::Configuration(_)));

    let err = service.extract(&html_request()).await.unwrap_err();
    assert!(matches!(err, ExtractionError::Configuration(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
