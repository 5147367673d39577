// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::settings::LlmSettings;
use crate::domain::repositories::secret_repository::SecretStore;
use crate::utils::errors::ExtractionError;

/// JSON形式密钥中依次查找的字段
const SECRET_JSON_KEYS: [&str; 3] = ["OPENAI_API_KEY", "openai_api_key", "api_key"];

/// 模型API密钥提供者
///
/// 解析顺序：直接配置的密钥优先，其次通过密钥存储按ID查找。
/// 解析成功的密钥缓存在实例内，在进程生命周期内视为不可变，因此不设过期。
pub struct CredentialProvider {
    direct: Option<String>,
    secret_id: Option<String>,
    store: Option<Arc<dyn SecretStore>>,
    cached: OnceCell<String>,
}

impl CredentialProvider {
    pub fn new(
        direct: Option<String>,
        secret_id: Option<String>,
        store: Option<Arc<dyn SecretStore>>,
    ) -> Self {
        Self {
            direct: direct.filter(|v| !v.trim().is_empty()),
            secret_id: secret_id.filter(|v| !v.trim().is_empty()),
            store,
            cached: OnceCell::new(),
        }
    }

    /// 根据模型配置创建
    pub fn from_settings(settings: &LlmSettings, store: Option<Arc<dyn SecretStore>>) -> Self {
        Self::new(
            settings.api_key.clone(),
            settings.api_key_secret_id.clone(),
            store,
        )
    }

    /// 使用固定密钥创建
    pub fn fixed(api_key: impl Into<String>) -> Self {
        Self::new(Some(api_key.into()), None, None)
    }

    /// 解析API密钥
    ///
    /// # 错误
    /// * 没有可用的密钥时返回 `ExtractionError::Configuration`
    /// * 密钥存储读取失败时返回 `ExtractionError::Configuration`
    pub async fn resolve(&self) -> Result<String, ExtractionError> {
        let key = self
            .cached
            .get_or_try_init(|| async { self.load().await })
            .await?;
        Ok(key.clone())
    }

    async fn load(&self) -> Result<String, ExtractionError> {
        if let Some(direct) = &self.direct {
            return Ok(direct.clone());
        }

        let secret_id = self.secret_id.as_deref().ok_or_else(|| {
            ExtractionError::Configuration("no model API key or secret id configured".to_string())
        })?;

        let store = self.store.as_ref().ok_or_else(|| {
            ExtractionError::Configuration(format!(
                "secret id {} configured but no secret store available",
                secret_id
            ))
        })?;

        debug!(secret_id = %secret_id, "Loading model API key from secret store");
        let raw = store.get_secret(secret_id).await.map_err(|e| {
            ExtractionError::Configuration(format!("failed to read secret {}: {}", secret_id, e))
        })?;

        raw.as_deref()
            .and_then(parse_secret_payload)
            .ok_or_else(|| {
                ExtractionError::Configuration(format!(
                    "secret {} does not contain a usable API key",
                    secret_id
                ))
            })
    }
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("direct", &self.direct.as_ref().map(|_| "[REDACTED]"))
            .field("secret_id", &self.secret_id)
            .field("resolved", &self.cached.initialized())
            .finish()
    }
}

/// 从密钥内容中取出API密钥
///
/// JSON对象按固定字段顺序查找，对象中没有这些字段时视为没有密钥；
/// 其他内容整体作为密钥使用。
pub fn parse_secret_payload(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => SECRET_JSON_KEYS
            .iter()
            .filter_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .find(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string()),
        _ => Some(trimmed.to_string()),
    }
}
