// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::settings::{LlmSettings, MAX_LLM_TIMEOUT_SECS};
use crate::domain::models::extraction::ExtractionRequest;
use crate::domain::services::credential_provider::CredentialProvider;
use crate::domain::services::response_text::{extract_response_text, top_level_keys};
use crate::utils::errors::{truncate_body, ExtractionError};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// 抽取客户端特质
///
/// 把模型请求发送出去并返回补全文本；单次尝试，不做内部重试。
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// 在任何网络调用之前确认凭据可用
    async fn ensure_credentials(&self) -> Result<(), ExtractionError> {
        Ok(())
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ExtractionError>;
}

/// LLM服务 - 处理与模型接口的交互
///
/// # 功能
///
/// 向 `{api_base_url}/responses` 发送请求，从多种响应形状中提取补全文本，
/// 并把传输、鉴权与响应格式问题映射为不同的错误类别。
///
/// # 配置
///
/// 由 [`LlmSettings`] 提供基础URL与超时，超时不超过60秒。
pub struct LLMService {
    client: reqwest::Client,
    endpoint: String,
    credentials: Arc<CredentialProvider>,
}

#[async_trait]
impl ExtractionClient for LLMService {
    async fn ensure_credentials(&self) -> Result<(), ExtractionError> {
        self.credentials.resolve().await.map(|_| ())
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        let task = request.task.as_str();
        let started = Instant::now();
        let result = self.send(request).await;

        histogram!("llm_request_duration_seconds", "task" => task)
            .record(started.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        counter!("llm_requests_total", "task" => task, "outcome" => outcome).increment(1);

        result
    }
}

impl LLMService {
    pub fn new(
        api_base_url: &str,
        timeout: Duration,
        credentials: Arc<CredentialProvider>,
    ) -> Result<Self, ExtractionError> {
        let timeout = timeout.min(Duration::from_secs(MAX_LLM_TIMEOUT_SECS));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ExtractionError::Configuration(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/responses", api_base_url.trim_end_matches('/')),
            credentials,
        })
    }

    pub fn from_settings(
        settings: &LlmSettings,
        credentials: Arc<CredentialProvider>,
    ) -> Result<Self, ExtractionError> {
        Self::new(
            &settings.api_base_url,
            Duration::from_secs(settings.effective_timeout_secs()),
            credentials,
        )
    }

    async fn send(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        let api_key = self.credentials.resolve().await?;

        let body = request.to_body().map_err(|e| {
            ExtractionError::Configuration(format!("failed to serialize request: {}", e))
        })?;

        info!(
            task = %request.task,
            model = %request.model,
            max_tokens = request.max_output_tokens,
            temperature = ?request.temperature,
            top_p = ?request.top_p,
            "Model request prepared"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                error!(error = %e, "Model request {}", kind);
                ExtractionError::transport(format!("model request {}: {}", kind, e))
            })?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            error!(status = status.as_u16(), error = %e, "Failed to read model response");
            ExtractionError::Transport {
                message: format!("failed to read model response: {}", e),
                status: Some(status.as_u16()),
            }
        })?;

        if !status.is_success() {
            let body = truncate_body(&raw);
            error!(status = status.as_u16(), body = %body, "Model request failed");
            return Err(match status.as_u16() {
                401 | 403 => ExtractionError::Auth {
                    status: status.as_u16(),
                    body,
                },
                code => ExtractionError::Transport {
                    message: format!("model API returned {}: {}", status, body),
                    status: Some(code),
                },
            });
        }

        let payload: Value = serde_json::from_str(&raw).map_err(|e| {
            warn!(error = %e, "Model response is not JSON");
            ExtractionError::ResponseMalformed { keys: Vec::new() }
        })?;

        if let Some(usage) = payload
            .get("usage")
            .and_then(|u| TokenUsage::deserialize(u).ok())
        {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                total_tokens = usage.total_tokens,
                "Model token usage"
            );
        }

        match extract_response_text(&payload) {
            Some((shape, text)) => {
                debug!(shape = shape.as_str(), "Model response text extracted");
                Ok(strip_code_fences(&text).to_string())
            }
            None => {
                let keys = top_level_keys(&payload);
                warn!(payload_keys = ?keys, "Model response missing output text");
                Err(ExtractionError::ResponseMalformed { keys })
            }
        }
    }
}

/// 去除首尾空白以及包裹整个补全的markdown代码块
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string line (```csv)
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
