// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::Arc;

use lunchrs::application::dto::menu_message::{QueueRecord, SourceObjectEvent};
use lunchrs::domain::repositories::storage_repository::StorageRepository;
use lunchrs::domain::services::menu_import::group_daily_menus;
use lunchrs::domain::models::weekly_key::WeeklyKey;
use lunchrs::infrastructure::storage::InMemoryStorage;
use lunchrs::utils::errors::ExtractionError;
use lunchrs::workers::MenuWorker;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::{responses_body, use_case, MENU_PAGE, VALID_CSV};

const EXPECTED_KEY: &str = "weekly/year=2024/week=02/pagoden.csv";

async fn menu_page_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lunch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(MENU_PAGE)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;
    server
}

async fn model_server(body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn queue_record(page: &MockServer) -> QueueRecord {
    QueueRecord {
        message_id: Some("msg-1".to_string()),
        body: json!({
            "restaurant_url": format!("{}/lunch", page.uri()),
            "restaurant_id": "pagoden",
            "city": "Göteborg",
            "area": "Centrum"
        })
        .to_string(),
    }
}

#[tokio::test]
async fn test_html_batch_fetches_extracts_and_stores_weekly_csv() {
    let page = menu_page_server().await;
    let model = model_server(responses_body(VALID_CSV)).await;
    let storage = Arc::new(InMemoryStorage::new());
    let worker = MenuWorker::new(
        Arc::new(use_case(&model.uri(), storage.clone())),
        storage.clone(),
    );

    let outcomes = worker
        .handle_queue_batch(&[queue_record(&page)])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].key.to_string(), EXPECTED_KEY);
    assert_eq!(outcomes[0].document.len(), 3);

    let stored = storage.get(EXPECTED_KEY).await.unwrap().unwrap();
    assert_eq!(String::from_utf8(stored.body).unwrap(), VALID_CSV.trim());
    assert_eq!(stored.content_type.as_deref(), Some("text/csv"));
    assert_eq!(
        stored.metadata,
        HashMap::from([
            ("restaurant_id".to_string(), "pagoden".to_string()),
            ("city".to_string(), "Göteborg".to_string()),
            ("area".to_string(), "Centrum".to_string()),
        ])
    );

    // The model sees normalized page text, not markup or chrome
    let requests = model.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(sent.contains("Dagens lunch"));
    assert!(!sent.contains("window.tracking"));
    assert!(!sent.contains("Hem | Meny"));
    assert!(!sent.contains("<h1>"));
}

#[tokio::test]
async fn test_stored_csv_imports_into_daily_menus() {
    let page = menu_page_server().await;
    let model = model_server(responses_body(VALID_CSV)).await;
    let storage = Arc::new(InMemoryStorage::new());
    let worker = MenuWorker::new(
        Arc::new(use_case(&model.uri(), storage.clone())),
        storage.clone(),
    );

    worker
        .handle_queue_batch(&[queue_record(&page)])
        .await
        .unwrap();

    let key = WeeklyKey::parse(EXPECTED_KEY).unwrap();
    let stored = storage.get(EXPECTED_KEY).await.unwrap().unwrap();
    let csv = String::from_utf8(stored.body).unwrap();
    let menus = group_daily_menus(&key, &csv, Some("Göteborg"), Some("Centrum"));

    assert_eq!(menus.len(), 3);
    assert_eq!(menus[0].sk, "MENU#2024_02#mon");
    assert_eq!(menus[0].dishes[0].price, Some(129));
}

#[tokio::test]
async fn test_malformed_model_response_leaves_storage_untouched() {
    let page = menu_page_server().await;
    let model = model_server(json!({ "id": "resp_9", "status": "failed" })).await;
    let storage = Arc::new(InMemoryStorage::new());
    let worker = MenuWorker::new(
        Arc::new(use_case(&model.uri(), storage.clone())),
        storage.clone(),
    );

    let err = worker
        .handle_queue_batch(&[queue_record(&page)])
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::ResponseMalformed { .. }));
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn test_invalid_csv_is_rejected_before_write() {
    let page = menu_page_server().await;
    let model = model_server(responses_body("day,lunch,price,tags\nfri,,abc,Vegan\n")).await;
    let storage = Arc::new(InMemoryStorage::new());
    let worker = MenuWorker::new(
        Arc::new(use_case(&model.uri(), storage.clone())),
        storage.clone(),
    );

    let err = worker
        .handle_queue_batch(&[queue_record(&page)])
        .await
        .unwrap_err();

    match err {
        ExtractionError::Validation(validation) => {
            assert_eq!(
                validation.codes(),
                vec!["row_2_lunch_empty", "row_2_price_invalid", "row_2_tag_invalid"]
            );
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn test_unreachable_page_is_transport_error() {
    let page = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&page)
        .await;
    let model = model_server(responses_body(VALID_CSV)).await;
    let storage = Arc::new(InMemoryStorage::new());
    let worker = MenuWorker::new(
        Arc::new(use_case(&model.uri(), storage.clone())),
        storage.clone(),
    );

    let err = worker
        .handle_queue_batch(&[queue_record(&page)])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExtractionError::Transport {
            status: Some(503),
            ..
        }
    ));
    assert!(model.received_requests().await.unwrap().is_empty());
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn test_image_events_extract_from_source_objects() {
    let model = model_server(responses_body(VALID_CSV)).await;
    let source = Arc::new(InMemoryStorage::new());
    source
        .put(
            "menus/pagoden/vecka 2.jpg",
            &[0xFF, 0xD8, 0xFF, 0xE0],
            "image/jpeg",
            &HashMap::new(),
        )
        .await
        .unwrap();
    let target = Arc::new(InMemoryStorage::new());
    let worker = MenuWorker::new(Arc::new(use_case(&model.uri(), target.clone())), source);

    let outcomes = worker
        .handle_source_objects(&[
            SourceObjectEvent {
                bucket: "menu-uploads".to_string(),
                key: "uploads/other.jpg".to_string(),
            },
            SourceObjectEvent {
                bucket: "menu-uploads".to_string(),
                key: "menus/pagoden/vecka+2.jpg".to_string(),
            },
        ])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(target.keys().await, vec![EXPECTED_KEY.to_string()]);

    let stored = target.get(EXPECTED_KEY).await.unwrap().unwrap();
    assert_eq!(
        stored.metadata,
        HashMap::from([("restaurant_id".to_string(), "pagoden".to_string())])
    );

    let requests = model.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(sent.contains("/9j/4A=="));
}
