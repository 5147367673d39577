// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::dto::menu_message::{ParseMenuMessage, QueueRecord, SourceObjectEvent};
use crate::domain::models::restaurant::RestaurantContext;
use crate::domain::repositories::storage_repository::{StorageError, StorageRepository};
use crate::domain::use_cases::extract_menu::{ExtractMenuUseCase, ExtractionOutcome};
use crate::utils::errors::ExtractionError;

/// 上传菜单图片的键前缀
const SOURCE_PREFIX: &str = "menus";

/// 菜单工作器
///
/// 处理两类批次：队列中的网页解析消息，以及菜单图片的对象创建事件。
/// 批次内逐条串行处理，第一条失败即中止，由队列或事件源负责重投。
pub struct MenuWorker {
    use_case: Arc<ExtractMenuUseCase>,
    source_storage: Arc<dyn StorageRepository>,
    worker_id: Uuid,
}

impl MenuWorker {
    /// 创建新的菜单工作器实例
    pub fn new(use_case: Arc<ExtractMenuUseCase>, source_storage: Arc<dyn StorageRepository>) -> Self {
        Self {
            use_case,
            source_storage,
            worker_id: Uuid::new_v4(),
        }
    }

    /// 处理一批网页解析消息
    #[instrument(skip(self, records), fields(worker_id = %self.worker_id, records = records.len()))]
    pub async fn handle_queue_batch(
        &self,
        records: &[QueueRecord],
    ) -> Result<Vec<ExtractionOutcome>, ExtractionError> {
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let message = ParseMenuMessage::from_json(&record.body).map_err(|e| {
                warn!(message_id = ?record.message_id, error = %e, "Rejected queue message");
                e
            })?;
            let context = message.into_context();
            outcomes.push(self.use_case.parse_html(&context).await?);
        }

        info!(processed = outcomes.len(), "Queue batch processed");
        Ok(outcomes)
    }

    /// 处理一批菜单图片的对象创建事件
    ///
    /// 只处理 `menus/<restaurant_id>/...` 下的对象，其余键被跳过。
    #[instrument(skip(self, events), fields(worker_id = %self.worker_id, events = events.len()))]
    pub async fn handle_source_objects(
        &self,
        events: &[SourceObjectEvent],
    ) -> Result<Vec<ExtractionOutcome>, ExtractionError> {
        let mut outcomes = Vec::new();
        for event in events {
            let key = decode_object_key(&event.key)?;
            let Some(restaurant_id) = restaurant_id_from_source_key(&key) else {
                info!(bucket = %event.bucket, key = %key, "Skipping object outside menu prefix");
                continue;
            };

            let object = self
                .source_storage
                .get(&key)
                .await?
                .ok_or_else(|| StorageError::NotFound(key.clone()))?;
            if object.body.is_empty() {
                return Err(ExtractionError::InvalidInput(format!(
                    "menu object {} is empty",
                    key
                )));
            }

            let context = RestaurantContext::for_restaurant(restaurant_id);
            outcomes.push(self.use_case.parse_image(object.body, &context).await?);
        }

        info!(processed = outcomes.len(), "Source object batch processed");
        Ok(outcomes)
    }
}

/// 解码事件中的对象键，`+` 表示空格
pub fn decode_object_key(raw: &str) -> Result<String, ExtractionError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|key| key.into_owned())
        .map_err(|e| ExtractionError::InvalidInput(format!("invalid object key {}: {}", raw, e)))
}

/// 从 `menus/<restaurant_id>/<file>` 形式的键中取出餐厅ID
pub fn restaurant_id_from_source_key(key: &str) -> Option<String> {
    let mut parts = key.splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(SOURCE_PREFIX), Some(id), Some(rest)) if !id.is_empty() && !rest.is_empty() => {
            Some(id.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restaurant_id_from_source_key() {
        assert_eq!(
            restaurant_id_from_source_key("menus/pagoden/vecka 2.jpg"),
            Some("pagoden".to_string())
        );
        assert_eq!(
            restaurant_id_from_source_key("menus/pagoden/2024/v2.png"),
            Some("pagoden".to_string())
        );
        assert_eq!(restaurant_id_from_source_key("menus//x.jpg"), None);
        assert_eq!(restaurant_id_from_source_key("menus/pagoden/"), None);
        assert_eq!(restaurant_id_from_source_key("uploads/pagoden/x.jpg"), None);
    }

    #[test]
    fn test_decode_object_key() {
        assert_eq!(
            decode_object_key("menus/k%C3%A5ken/vecka+2.jpg").unwrap(),
            "menus/kåken/vecka 2.jpg"
        );
        assert_eq!(decode_object_key("a%2Bb").unwrap(), "a+b");
    }
}
