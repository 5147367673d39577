// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::warn;

/// 默认模型
pub const DEFAULT_MODEL: &str = "gpt-4.1-2025-04-14";
/// 默认模型API地址
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
/// 模型请求超时上限（秒）
pub const MAX_LLM_TIMEOUT_SECS: u64 = 60;

/// 应用程序配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 模型配置
    pub llm: LlmSettings,
    /// 页面抓取配置
    pub fetch: FetchSettings,
    /// 对象存储配置
    pub storage: StorageSettings,
    /// 密钥存储配置
    #[serde(default)]
    pub secrets: SecretsSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 模型配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// 模型名称
    pub model: String,
    /// API基础URL，请求发送到 `{api_base_url}/responses`
    pub api_base_url: String,
    /// 直接配置的API密钥
    pub api_key: Option<String>,
    /// 存放API密钥的密钥ID（名称或ARN）
    pub api_key_secret_id: Option<String>,
    /// 全局默认的最大输出token数
    pub max_tokens: Option<u32>,
    /// 按餐厅ID覆盖的最大输出token数
    #[serde(default)]
    pub max_tokens_overrides: HashMap<String, u32>,
    /// 采样温度，未配置时不发送
    pub temperature: Option<f32>,
    /// top_p，未配置时不发送
    pub top_p: Option<f32>,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            api_key_secret_id: None,
            max_tokens: None,
            max_tokens_overrides: HashMap::new(),
            temperature: None,
            top_p: None,
            timeout_secs: MAX_LLM_TIMEOUT_SECS,
        }
    }
}

impl LlmSettings {
    /// 生效的请求超时，不超过上限
    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.clamp(1, MAX_LLM_TIMEOUT_SECS)
    }
}

/// 页面抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// 抓取超时（秒）
    pub timeout_secs: u64,
    /// 请求使用的User-Agent
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (compatible; lunchrs/0.1)".to_string(),
        }
    }
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 存储类型 (local, s3, memory)
    pub storage_type: String,
    /// 本地存储路径 (当 type=local 时使用)
    pub local_path: Option<String>,
    /// S3 区域
    pub s3_region: Option<String>,
    /// S3 存储桶名称
    pub s3_bucket: Option<String>,
    /// S3 访问密钥
    pub s3_access_key: Option<String>,
    /// S3 密钥
    pub s3_secret_key: Option<String>,
    /// S3 端点 (可选，用于 MinIO 等兼容服务)
    pub s3_endpoint: Option<String>,
}

/// 密钥存储配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsSettings {
    /// 文件密钥存储目录
    pub secrets_dir: Option<String>,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动Prometheus导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 以及
    /// `LUNCHRS__` 前缀的环境变量；原部署使用的 `OPENAI_*` 等环境变量优先级最高。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let secret_id = std::env::var("OPENAI_API_KEY_SECRET_ARN")
            .or_else(|_| std::env::var("OPENAI_API_KEY_SECRET_NAME"))
            .ok();

        let builder = Config::builder()
            // Model defaults
            .set_default("llm.model", DEFAULT_MODEL)?
            .set_default("llm.api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("llm.timeout_secs", MAX_LLM_TIMEOUT_SECS)?
            // Fetch defaults
            .set_default("fetch.timeout_secs", 30)?
            .set_default("fetch.user_agent", "Mozilla/5.0 (compatible; lunchrs/0.1)")?
            // Storage defaults
            .set_default("storage.storage_type", "local")?
            .set_default("storage.local_path", "./storage")?
            // Metrics defaults
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LUNCHRS").separator("__"))
            .set_override_option("llm.api_key", non_empty_env("OPENAI_API_KEY"))?
            .set_override_option("llm.api_key_secret_id", secret_id.filter(|s| !s.is_empty()))?
            .set_override_option("llm.model", non_empty_env("OPENAI_MODEL"))?
            .set_override_option("llm.max_tokens", non_empty_env("OPENAI_MAX_TOKENS"))?
            .set_override_option("llm.temperature", non_empty_env("OPENAI_TEMPERATURE"))?
            .set_override_option("llm.top_p", non_empty_env("OPENAI_TOP_P"))?
            .set_override_option("storage.s3_bucket", non_empty_env("WEEKLY_LUNCHMENUS_BUCKET"))?;

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(raw) = non_empty_env("OPENAI_MAX_TOKENS_OVERRIDES") {
            settings
                .llm
                .max_tokens_overrides
                .extend(parse_max_tokens_overrides(&raw));
        }

        Ok(settings)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// 解析按餐厅覆盖的token上限（JSON对象），非法内容被忽略
pub fn parse_max_tokens_overrides(raw: &str) -> HashMap<String, u32> {
    match serde_json::from_str::<HashMap<String, serde_json::Value>>(raw) {
        Ok(map) => map
            .into_iter()
            .filter_map(|(id, value)| {
                let tokens = match &value {
                    serde_json::Value::Number(n) => n.as_u64(),
                    serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
                    _ => None,
                };
                match tokens.and_then(|t| u32::try_from(t).ok()) {
                    Some(t) => Some((id, t)),
                    None => {
                        warn!(restaurant_id = %id, "Ignoring non-integer max tokens override");
                        None
                    }
                }
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "Ignoring invalid OPENAI_MAX_TOKENS_OVERRIDES");
            HashMap::new()
        }
    }
}
