// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 页面抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非成功状态码
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    /// 超时
    #[error("Timeout fetching {0}")]
    Timeout(String),
}

impl FetchError {
    /// 响应状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            FetchError::Timeout(_) => None,
        }
    }
}

/// 抓取到的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub content: String,
    /// 内容类型
    pub content_type: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 页面抓取特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取页面HTML，非2xx状态视为失败
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
