// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::domain::models::extraction::{ExtractionTask, TaskKind};
use crate::domain::models::menu::MenuCsvDocument;
use crate::domain::models::restaurant::RestaurantContext;
use crate::domain::models::weekly_key::WeeklyKey;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::services::csv_validator;
use crate::domain::services::html_normalizer;
use crate::domain::services::llm_service::ExtractionClient;
use crate::domain::services::request_builder::RequestBuilder;
use crate::engines::traits::{FetchError, PageFetcher};
use crate::utils::errors::ExtractionError;

/// 菜单CSV的内容类型
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// 时钟函数，决定写入哪一周
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// 一次成功抽取的结果
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// 写入的存储键
    pub key: WeeklyKey,
    /// 通过校验的菜单
    pub document: MenuCsvDocument,
}

/// 菜单抽取用例
///
/// 串行执行：抓取 → 规范化 → 构建请求 → 调用模型 → 校验 → 写入存储。
/// 校验严格发生在写入之前，任何失败都不会留下部分结果；
/// 同一周重复写入同一键时以最后一次为准。
pub struct ExtractMenuUseCase {
    fetcher: Arc<dyn PageFetcher>,
    client: Arc<dyn ExtractionClient>,
    builder: RequestBuilder,
    storage: Arc<dyn StorageRepository>,
    clock: Clock,
}

impl ExtractMenuUseCase {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        client: Arc<dyn ExtractionClient>,
        builder: RequestBuilder,
        storage: Arc<dyn StorageRepository>,
    ) -> Self {
        Self {
            fetcher,
            client,
            builder,
            storage,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// 抓取餐厅网页并抽取本周菜单
    pub async fn parse_html(
        &self,
        context: &RestaurantContext,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let span = invocation_span(TaskKind::Html, context);
        let result: Result<ExtractionOutcome, ExtractionError> = async {
            if context.restaurant_id.trim().is_empty() || context.restaurant_url.trim().is_empty() {
                return Err(ExtractionError::InvalidInput(
                    "restaurant_url and restaurant_id are required".to_string(),
                ));
            }
            self.client.ensure_credentials().await?;

            let page = self
                .fetcher
                .fetch(&context.restaurant_url)
                .await
                .map_err(fetch_to_extraction_error)?;
            info!(
                status_code = page.status_code,
                bytes = page.content.len(),
                response_time_ms = page.response_time_ms,
                "Fetched restaurant page"
            );

            let text = html_normalizer::normalize(&page.content);
            self.extract_and_store(ExtractionTask::Html(text), context)
                .await
        }
        .instrument(span)
        .await;

        record_outcome(TaskKind::Html, &result);
        result
    }

    /// 从菜单图片抽取本周菜单
    pub async fn parse_image(
        &self,
        image: Vec<u8>,
        context: &RestaurantContext,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let span = invocation_span(TaskKind::Image, context);
        let result: Result<ExtractionOutcome, ExtractionError> = async {
            if context.restaurant_id.trim().is_empty() {
                return Err(ExtractionError::InvalidInput(
                    "restaurant_id is required".to_string(),
                ));
            }
            if image.is_empty() {
                return Err(ExtractionError::InvalidInput("image is empty".to_string()));
            }
            self.client.ensure_credentials().await?;

            self.extract_and_store(ExtractionTask::Image(image), context)
                .await
        }
        .instrument(span)
        .await;

        record_outcome(TaskKind::Image, &result);
        result
    }

    async fn extract_and_store(
        &self,
        task: ExtractionTask,
        context: &RestaurantContext,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let request = self.builder.build(&task, context)?;

        let csv_text = self.client.extract(&request).await?;

        let document = csv_validator::validate(&csv_text).map_err(|e| {
            let reasons: Vec<String> = e.reasons.iter().map(|r| r.to_string()).collect();
            error!(reasons = ?reasons, csv = %csv_text, "Model CSV validation failed");
            ExtractionError::from(e)
        })?;

        let key = WeeklyKey::for_date(context.restaurant_id.clone(), (self.clock)());
        let object_key = key.to_string();
        self.storage
            .put(
                &object_key,
                csv_text.as_bytes(),
                CSV_CONTENT_TYPE,
                &object_metadata(context),
            )
            .await?;

        info!(key = %object_key, rows = document.len(), "Stored weekly menu");
        Ok(ExtractionOutcome { key, document })
    }
}

/// 写入对象时附带的元数据
pub fn object_metadata(context: &RestaurantContext) -> HashMap<String, String> {
    let mut metadata = HashMap::from([(
        "restaurant_id".to_string(),
        context.restaurant_id.clone(),
    )]);
    if !context.city.is_empty() {
        metadata.insert("city".to_string(), context.city.clone());
    }
    if !context.area.is_empty() {
        metadata.insert("area".to_string(), context.area.clone());
    }
    metadata
}

fn invocation_span(task: TaskKind, context: &RestaurantContext) -> tracing::Span {
    info_span!(
        "extract_menu",
        invocation_id = %Uuid::new_v4(),
        task = task.as_str(),
        restaurant_id = %context.restaurant_id,
    )
}

fn fetch_to_extraction_error(e: FetchError) -> ExtractionError {
    error!(error = %e, "Failed to fetch restaurant page");
    ExtractionError::Transport {
        message: format!("page fetch failed: {}", e),
        status: e.status(),
    }
}

fn record_outcome<T>(task: TaskKind, result: &Result<T, ExtractionError>) {
    match result {
        Ok(_) => counter!("menu_extractions_total", "task" => task.as_str()).increment(1),
        Err(e) => {
            error!(
                task = task.as_str(),
                kind = e.kind(),
                retryable = e.is_retryable(),
                error = %e,
                "Menu extraction failed"
            );
            counter!(
                "menu_extraction_failures_total",
                "task" => task.as_str(),
                "kind" => e.kind()
            )
            .increment(1)
        }
    }
}

#[cfg(test)]
#[path = "extract_menu_test.rs"]
mod tests;
