// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;

use thiserror::Error;

use crate::domain::repositories::storage_repository::StorageError;

/// 错误正文在日志与错误信息中保留的最大字符数
pub const MAX_ERROR_BODY_CHARS: usize = 2000;

/// 单条CSV校验问题
///
/// `code` 为稳定的机器可读标识（如 `row_2_day_invalid`），
/// `detail` 为可选的附加信息（如出错的字段值）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub code: String,
    pub detail: Option<String>,
}

impl ValidationIssue {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: None,
        }
    }

    pub fn with_detail(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.code, detail),
            None => f.write_str(&self.code),
        }
    }
}

/// CSV校验错误，包含按出现顺序收集的全部问题
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("menu CSV validation failed: {}", format_reasons(.reasons))]
pub struct ValidationError {
    pub reasons: Vec<ValidationIssue>,
}

impl ValidationError {
    /// 所有问题的代码，按出现顺序排列
    pub fn codes(&self) -> Vec<&str> {
        self.reasons.iter().map(|r| r.code.as_str()).collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.reasons.iter().any(|r| r.code == code)
    }
}

fn format_reasons(reasons: &[ValidationIssue]) -> String {
    reasons
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// 菜单提取流水线错误类型
///
/// 每种错误都会终止当前调用，是否重试由外部的消息重投机制决定。
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// 缺少凭据或模型配置，不可重试
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 访问模型或抓取页面时的网络/超时错误，可由外部重投
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// 凭据被拒绝，需要运维修正密钥
    #[error("Auth error: status {status}: {body}")]
    Auth { status: u16, body: String },

    /// 模型响应中没有可识别的文本字段
    #[error("Extraction response malformed (keys: {keys:?})")]
    ResponseMalformed { keys: Vec<String> },

    /// 模型输出违反CSV约束
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 调用方提供的输入不可用（消息缺字段、空图片等）
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 对象存储读写失败
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ExtractionError {
    pub fn transport(message: impl Into<String>) -> Self {
        ExtractionError::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// 判断错误是否值得由外部机制重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExtractionError::Transport { .. } | ExtractionError::Storage(_)
        )
    }

    /// 用于日志与指标标签的稳定错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::Configuration(_) => "configuration",
            ExtractionError::Transport { .. } => "transport",
            ExtractionError::Auth { .. } => "auth",
            ExtractionError::ResponseMalformed { .. } => "response_malformed",
            ExtractionError::Validation(_) => "validation",
            ExtractionError::InvalidInput(_) => "invalid_input",
            ExtractionError::Storage(_) => "storage",
        }
    }
}

/// 按字符截断错误正文，避免在日志中写入超长响应
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
