// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;
use tokio::sync::RwLock;

use crate::domain::repositories::secret_repository::{SecretError, SecretStore};

/// 文件系统密钥存储
///
/// 每个密钥对应目录下的一个文件，ARN等包含 `/` 或 `:` 的密钥ID会把这些字符替换为 `_`。
pub struct FileSecretStore {
    base_path: PathBuf,
}

impl FileSecretStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn secret_path(&self, secret_id: &str) -> PathBuf {
        let file_name: String = secret_id
            .chars()
            .map(|c| if c == '/' || c == ':' { '_' } else { c })
            .collect();
        Path::new(&self.base_path).join(file_name)
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, secret_id: &str) -> Result<Option<String>, SecretError> {
        if secret_id.is_empty() || secret_id.chars().all(|c| c == '.') {
            return Err(SecretError::Other(format!("invalid secret id: {:?}", secret_id)));
        }

        match fs::read_to_string(self.secret_path(secret_id)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SecretError::Io(e)),
        }
    }
}

/// 测试用的内存密钥存储
#[derive(Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
    reads: AtomicUsize,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, secret_id: &str, value: &str) {
        self.secrets
            .write()
            .await
            .insert(secret_id.to_string(), value.to_string());
    }

    /// 已发生的读取次数
    pub async fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret(&self, secret_id: &str) -> Result<Option<String>, SecretError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.secrets.read().await.get(secret_id).cloned())
    }
}
