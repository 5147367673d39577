// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::settings::LlmSettings;
use crate::domain::models::extraction::{ExtractionRequest, ExtractionTask, RequestPayload};
use crate::domain::models::restaurant::RestaurantContext;
use crate::domain::services::prompts::{task_prompt, SYSTEM_PROMPT};
use crate::utils::errors::ExtractionError;

/// 未配置任何上限时使用的最大输出token数
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// 模型请求构建器
///
/// 持有模型名称、token上限（含按餐厅覆盖）与可选的采样参数。
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    model: String,
    max_tokens: Option<u32>,
    max_tokens_overrides: HashMap<String, u32>,
    temperature: Option<f32>,
    top_p: Option<f32>,
}

impl RequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            max_tokens_overrides: HashMap::new(),
            temperature: None,
            top_p: None,
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            max_tokens_overrides: settings.max_tokens_overrides.clone(),
            temperature: settings.temperature,
            top_p: settings.top_p,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_override(mut self, restaurant_id: impl Into<String>, max_tokens: u32) -> Self {
        self.max_tokens_overrides
            .insert(restaurant_id.into(), max_tokens);
        self
    }

    pub fn with_sampling(mut self, temperature: Option<f32>, top_p: Option<f32>) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }

    /// 解析餐厅的最大输出token数
    ///
    /// 优先级：按餐厅覆盖 > 全局配置 > 固定默认值。
    pub fn resolve_max_tokens(&self, restaurant_id: &str) -> u32 {
        self.max_tokens_overrides
            .get(restaurant_id)
            .copied()
            .or(self.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// 为任务构建模型请求
    pub fn build(
        &self,
        task: &ExtractionTask,
        context: &RestaurantContext,
    ) -> Result<ExtractionRequest, ExtractionError> {
        let max_tokens = self.resolve_max_tokens(&context.restaurant_id);
        let mut request = build(task, context, &self.model, max_tokens)?;
        request.temperature = self.temperature;
        request.top_p = self.top_p;
        Ok(request)
    }
}

/// 构建模型请求，不含采样参数
///
/// # 错误
/// * 模型名为空或token上限为0时返回 `ExtractionError::Configuration`
pub fn build(
    task: &ExtractionTask,
    context: &RestaurantContext,
    model: &str,
    max_tokens: u32,
) -> Result<ExtractionRequest, ExtractionError> {
    if model.trim().is_empty() {
        return Err(ExtractionError::Configuration(
            "model name is empty".to_string(),
        ));
    }
    if max_tokens == 0 {
        return Err(ExtractionError::Configuration(
            "max output tokens must be positive".to_string(),
        ));
    }

    let payload = match task {
        ExtractionTask::Html(text) => RequestPayload::Text(text.clone()),
        ExtractionTask::Image(bytes) => RequestPayload::Image {
            image_bytes_base64: STANDARD.encode(bytes),
            image_bytes_len: bytes.len(),
        },
    };

    Ok(ExtractionRequest {
        model: model.to_string(),
        max_output_tokens: max_tokens,
        system_prompt: SYSTEM_PROMPT.to_string(),
        task_prompt: task_prompt(task.kind()).to_string(),
        context: context.clone(),
        payload,
        task: task.kind(),
        temperature: None,
        top_p: None,
    })
}
