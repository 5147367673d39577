// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use aws_sdk_s3::config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::config::settings::StorageSettings;
use crate::domain::repositories::storage_repository::{
    StorageError, StorageRepository, StoredObject,
};

/// S3 对象存储实现
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    /// 使用静态凭证创建
    pub fn new(
        region: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        endpoint: Option<String>,
    ) -> Self {
        let credentials =
            aws_sdk_s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let mut config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region))
            .credentials_provider(credentials);

        if let Some(ep) = endpoint {
            config_builder = config_builder.endpoint_url(ep).force_path_style(true);
        }

        let client = aws_sdk_s3::Client::from_conf(config_builder.build());

        Self { client, bucket }
    }

    /// 使用运行环境的默认凭证链创建（环境变量、实例角色等）
    pub async fn from_env(bucket: String, region: Option<String>, endpoint: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;

        let mut config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(ep) = endpoint {
            config_builder = config_builder.endpoint_url(ep).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(config_builder.build()),
            bucket,
        }
    }
}

#[async_trait]
impl StorageRepository for S3Storage {
    async fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .set_metadata(Some(metadata.clone()))
            .body(ByteStream::from(body.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let content_type = output.content_type().map(str::to_string);
                let metadata = output.metadata().cloned().unwrap_or_default();
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::Other(e.to_string()))?
                    .into_bytes();
                Ok(Some(StoredObject {
                    body: data.to_vec(),
                    content_type,
                    metadata,
                }))
            }
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(StorageError::Other(service_error.to_string()))
                }
            }
        }
    }
}

/// 本地文件元数据，保存在对象旁的 `.meta.json` 文件中
#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalObjectMeta {
    content_type: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// 本地文件系统存储实现
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn get_full_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(StorageError::Other(format!("Invalid object key: {}", key)));
        }
        Ok(self.base_path.join(relative))
    }

    fn meta_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".meta.json");
        PathBuf::from(name)
    }
}

#[async_trait]
impl StorageRepository for LocalStorage {
    async fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<(), StorageError> {
        let full_path = self.get_full_path(key)?;

        // 确保目录存在
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(body).await?;
        file.flush().await?;

        let meta = LocalObjectMeta {
            content_type: Some(content_type.to_string()),
            metadata: metadata.clone(),
        };
        let meta_json =
            serde_json::to_vec_pretty(&meta).map_err(|e| StorageError::Other(e.to_string()))?;
        fs::write(Self::meta_path(&full_path), meta_json).await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let full_path = self.get_full_path(key)?;

        let body = match fs::read(&full_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let meta = match fs::read(Self::meta_path(&full_path)).await {
            Ok(raw) => serde_json::from_slice::<LocalObjectMeta>(&raw)
                .map_err(|e| StorageError::Other(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LocalObjectMeta::default(),
            Err(e) => return Err(StorageError::Io(e)),
        };

        Ok(Some(StoredObject {
            body,
            content_type: meta.content_type,
            metadata: meta.metadata,
        }))
    }
}

/// 存储工厂函数
pub async fn create_storage_repository(
    settings: &StorageSettings,
) -> Result<Arc<dyn StorageRepository>, StorageError> {
    match settings.storage_type.as_str() {
        "local" => {
            let base_path = settings
                .local_path
                .clone()
                .unwrap_or_else(|| "./storage".to_string());
            Ok(Arc::new(LocalStorage::new(base_path)))
        }
        "memory" => Ok(Arc::new(InMemoryStorage::new())),
        "s3" => {
            let bucket = settings
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::Other("S3 bucket not configured".to_string()))?;

            match (&settings.s3_access_key, &settings.s3_secret_key) {
                (Some(access_key), Some(secret_key)) => Ok(Arc::new(S3Storage::new(
                    settings
                        .s3_region
                        .clone()
                        .unwrap_or_else(|| "eu-north-1".to_string()),
                    bucket,
                    access_key.clone(),
                    secret_key.clone(),
                    settings.s3_endpoint.clone(),
                ))),
                _ => Ok(Arc::new(
                    S3Storage::from_env(
                        bucket,
                        settings.s3_region.clone(),
                        settings.s3_endpoint.clone(),
                    )
                    .await,
                )),
            }
        }
        other => Err(StorageError::Other(format!(
            "Unsupported storage type: {}",
            other
        ))),
    }
}

/// 测试用的内存存储实现（用于单元测试）
#[derive(Default)]
pub struct InMemoryStorage {
    data: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前保存的对象数量
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// 已保存的全部键
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl StorageRepository for InMemoryStorage {
    async fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<(), StorageError> {
        let mut map = self.data.write().await;
        map.insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                content_type: Some(content_type.to_string()),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let map = self.data.read().await;
        Ok(map.get(key).cloned())
    }
}
