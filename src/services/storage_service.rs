use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;

pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// Called with monotonically increasing percentages, ending at 100.
pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

pub struct UploadOptions {
    pub bucket: String,
    pub path: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub progress: Option<ProgressCallback>,
}

impl UploadOptions {
    pub fn new(bucket: &str, path: &str, bytes: Vec<u8>) -> Self {
        Self {
            bucket: bucket.to_string(),
            path: path.to_string(),
            bytes,
            content_type: None,
            progress: None,
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageObject {
    pub path: String,
    pub size: u64,
    pub updated_at: Option<String>,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn upload(&self, options: UploadOptions) -> ServiceResult<UploadResult>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
    /// `expires_in` in seconds; defaults to [`DEFAULT_SIGNED_URL_TTL_SECS`].
    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Option<u64>,
    ) -> ServiceResult<String>;
    async fn download(&self, bucket: &str, path: &str) -> ServiceResult<Vec<u8>>;
    async fn list(&self, bucket: &str, prefix: &str) -> ServiceResult<Vec<StorageObject>>;
    async fn delete(&self, bucket: &str, path: &str) -> ServiceResult<()>;
    async fn move_object(&self, bucket: &str, from: &str, to: &str) -> ServiceResult<()>;
    async fn copy_object(&self, bucket: &str, from: &str, to: &str) -> ServiceResult<()>;
    async fn create_bucket(&self, name: &str, public: bool) -> ServiceResult<()>;
    async fn delete_bucket(&self, name: &str) -> ServiceResult<()>;
}
