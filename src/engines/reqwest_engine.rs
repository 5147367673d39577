// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::FetchSettings;
use crate::engines::traits::{FetchError, FetchedPage, PageFetcher};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// 抓取引擎
///
/// 基于reqwest实现的基本HTTP抓取引擎，每个请求都受超时约束
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_settings(settings: &FetchSettings) -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(settings.timeout_secs), &settings.user_agent)
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 抓取到的页面
    /// * `Err(FetchError)` - 网络错误、超时或非2xx状态
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::RequestFailed(e)
            }
        })?;

        let status_code = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: status_code,
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("text/html")
            .to_string();

        // Decodes using the declared charset
        let content = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::RequestFailed(e)
            }
        })?;

        let response_time_ms = start.elapsed().as_millis() as u64;
        debug!(url, status_code, response_time_ms, "Fetched page");

        Ok(FetchedPage {
            status_code,
            content,
            content_type,
            response_time_ms,
        })
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
