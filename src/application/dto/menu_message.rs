// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::restaurant::RestaurantContext;
use crate::utils::errors::ExtractionError;

/// 网页解析队列消息
///
/// 每条消息对应一家餐厅，由外部入队程序按餐厅扇出。
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ParseMenuMessage {
    /// 餐厅网页地址
    #[serde(default)]
    #[validate(url(message = "restaurant_url must be a valid URL"))]
    pub restaurant_url: String,
    /// 餐厅ID
    #[serde(default)]
    #[validate(
        length(min = 1, message = "restaurant_id cannot be empty"),
        custom(function = "validate_restaurant_id")
    )]
    pub restaurant_id: String,
    /// 城市
    #[serde(default)]
    pub city: String,
    /// 区域
    #[serde(default)]
    pub area: String,
}

impl ParseMenuMessage {
    /// 解析并校验消息正文
    ///
    /// # 错误
    /// * 正文不是合法JSON或缺少必填字段时返回 `ExtractionError::InvalidInput`
    pub fn from_json(body: &str) -> Result<Self, ExtractionError> {
        let message: ParseMenuMessage = serde_json::from_str(body)
            .map_err(|e| ExtractionError::InvalidInput(format!("invalid message body: {}", e)))?;
        message
            .validate()
            .map_err(|e| ExtractionError::InvalidInput(e.to_string()))?;
        Ok(message)
    }

    pub fn into_context(self) -> RestaurantContext {
        RestaurantContext::new(self.restaurant_id, self.restaurant_url, self.city, self.area)
    }
}

/// 餐厅ID会成为周键的最后一段路径，不能包含 `/`
fn validate_restaurant_id(restaurant_id: &str) -> Result<(), validator::ValidationError> {
    if restaurant_id.contains('/') {
        let mut error = validator::ValidationError::new("restaurant_id_path");
        error.message = Some("restaurant_id cannot contain '/'".into());
        return Err(error);
    }
    Ok(())
}

/// 队列中的一条记录
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueRecord {
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
    pub body: String,
}

/// 对象创建事件
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceObjectEvent {
    pub bucket: String,
    /// URL编码的对象键（空格编码为 `+`）
    pub key: String,
}
