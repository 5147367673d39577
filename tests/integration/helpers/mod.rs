// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use lunchrs::domain::repositories::storage_repository::StorageRepository;
use lunchrs::domain::services::credential_provider::CredentialProvider;
use lunchrs::domain::services::llm_service::LLMService;
use lunchrs::domain::services::request_builder::RequestBuilder;
use lunchrs::domain::use_cases::extract_menu::ExtractMenuUseCase;
use lunchrs::engines::reqwest_engine::ReqwestEngine;
use lunchrs::infrastructure::storage::InMemoryStorage;
use serde_json::{json, Value};

pub const TEST_API_KEY: &str = "sk-test-lunch";
pub const TEST_MODEL: &str = "gpt-4.1-2025-04-14";

pub const VALID_CSV: &str = "day,lunch,price,tags\nmon,Fiskgratäng med dillpotatis,129,fisk | svenskt\ntue,Pasta carbonara,119,italienskt\nwed,Vegetarisk lasagne,115,vegetariskt\n";

pub const MENU_PAGE: &str = r#"<html>
<head><title>Restaurang Pagoden</title><style>body { color: red; }</style></head>
<body>
  <nav>Hem | Meny | Kontakt</nav>
  <h1>Dagens lunch</h1>
  <p>Måndag: Fiskgratäng med dillpotatis 129 kr</p>
  <script>window.tracking = true;</script>
  <footer>Öppet 11-14</footer>
</body>
</html>"#;

/// 2024-01-08（ISO第2周的周一）
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 8, 10, 30, 0).unwrap()
}

/// 以Responses接口的形状包装补全文本
pub fn responses_body(text: &str) -> Value {
    json!({
        "id": "resp_123",
        "status": "completed",
        "output": [{
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "output_text", "text": text }]
        }],
        "usage": { "input_tokens": 812, "output_tokens": 96, "total_tokens": 908 }
    })
}

pub fn llm_service(base_url: &str, timeout: Duration) -> LLMService {
    LLMService::new(
        base_url,
        timeout,
        Arc::new(CredentialProvider::fixed(TEST_API_KEY)),
    )
    .unwrap()
}

/// 组装指向模拟模型服务的抽取用例
pub fn use_case(model_base_url: &str, storage: Arc<InMemoryStorage>) -> ExtractMenuUseCase {
    let fetcher = ReqwestEngine::new(Duration::from_secs(5), "lunchrs-test").unwrap();
    let storage: Arc<dyn StorageRepository> = storage;
    ExtractMenuUseCase::new(
        Arc::new(fetcher),
        Arc::new(llm_service(model_base_url, Duration::from_secs(5))),
        RequestBuilder::new(TEST_MODEL),
        storage,
    )
    .with_clock(fixed_now)
}
