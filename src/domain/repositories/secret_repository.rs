// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 密钥存储错误类型
#[derive(Error, Debug)]
pub enum SecretError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 密钥存储错误
    #[error("Secret store error: {0}")]
    Other(String),
}

/// 密钥存储特质
///
/// 按名称或ARN读取密钥的原始字符串内容
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// 读取密钥，不存在时返回 `None`
    async fn get_secret(&self, secret_id: &str) -> Result<Option<String>, SecretError>;
}
