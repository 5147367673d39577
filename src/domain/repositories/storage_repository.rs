// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 对象不存在
    #[error("Object not found: {0}")]
    NotFound(String),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 存储中的对象及其元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// 对象内容
    pub body: Vec<u8>,
    /// 内容类型
    pub content_type: Option<String>,
    /// 用户元数据
    pub metadata: HashMap<String, String>,
}

/// 存储仓库特质
///
/// 定义周菜单对象与上传图片的读写接口
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// 使用指定键写入对象，覆盖已有内容
    async fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<(), StorageError>;

    /// 根据键读取对象
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError>;
}
