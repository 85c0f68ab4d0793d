use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::StorageError;

pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

pub const UPLOADS_PREFIX: &str = "/uploads";

#[async_trait]
pub trait FileStager: Send + Sync {
    async fn stage(
        &self,
        field: &str,
        original_name: &str,
        payload: &[u8],
    ) -> Result<String, StorageError>;
}

pub fn ensure_dirs(upload_folder: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)
}

pub fn staged_file_name(field: &str, original_name: &str) -> String {
    let mut sanitized = sanitize_filename::sanitize(original_name);
    if sanitized.is_empty() {
        sanitized = format!("{}.bin", field);
    }
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_micros(),
        &Uuid::new_v4().simple().to_string()[..8],
        sanitized
    )
}

pub struct DiskStager {
    root: PathBuf,
}

impl DiskStager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStager for DiskStager {
    async fn stage(
        &self,
        field: &str,
        original_name: &str,
        payload: &[u8],
    ) -> Result<String, StorageError> {
        let stored_name = staged_file_name(field, original_name);
        let path = self.root.join(&stored_name);

        let write = async {
            let mut file = tokio::fs::File::create(&path).await?;
            file.write_all(payload).await?;
            file.sync_all().await
        };
        write
            .await
            .map_err(|source| StorageError::StorageWriteError {
                stored_name: stored_name.clone(),
                source,
            })?;

        tracing::debug!(field, stored_name = %stored_name, bytes = payload.len(), "staged upload");
        Ok(format!("{}/{}", UPLOADS_PREFIX, stored_name))
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStager {
        pub files: Mutex<HashMap<String, Vec<u8>>>,
        pub fail_field: Option<String>,
    }

    impl MemoryStager {
        pub fn failing_on(field: &str) -> Self {
            Self {
                fail_field: Some(field.to_string()),
                ..Default::default()
            }
        }

        pub fn staged_count(&self) -> usize {
            self.files.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl FileStager for MemoryStager {
        async fn stage(
            &self,
            field: &str,
            original_name: &str,
            payload: &[u8],
        ) -> Result<String, StorageError> {
            let stored_name = staged_file_name(field, original_name);
            if self.fail_field.as_deref() == Some(field) {
                return Err(StorageError::StorageWriteError {
                    stored_name,
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.files
                .lock()
                .unwrap()
                .insert(stored_name.clone(), payload.to_vec());
            Ok(format!("{}/{}", UPLOADS_PREFIX, stored_name))
        }
    }
}
