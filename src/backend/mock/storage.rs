use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ServiceError, ServiceResult};
use crate::services::storage_service::{
    StorageObject, StorageService, UploadOptions, UploadResult, DEFAULT_SIGNED_URL_TTL_SECS,
};

const BASE_URL: &str = "https://storage.mock.bhakti.app";
const PROGRESS_STEPS: [u8; 4] = [25, 50, 75, 100];

#[derive(Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    updated_at: String,
}

/// In-memory blob storage: bucket -> path -> bytes. A `media` bucket exists
/// out of the box, matching the app's default upload target.
pub struct MockStorageService {
    buckets: Mutex<HashMap<String, HashMap<String, StoredObject>>>,
    latency: Duration,
}

impl Default for MockStorageService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStorageService {
    pub fn new() -> Self {
        let mut buckets = HashMap::new();
        buckets.insert("media".to_string(), HashMap::new());
        Self {
            buckets: Mutex::new(buckets),
            latency: Duration::from_millis(10),
        }
    }

    fn with_bucket<T>(
        &self,
        bucket: &str,
        f: impl FnOnce(&mut HashMap<String, StoredObject>) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match buckets.get_mut(bucket) {
            Some(objects) => f(objects),
            None => Err(ServiceError::NotFound(format!("bucket {bucket}"))),
        }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload(&self, options: UploadOptions) -> ServiceResult<UploadResult> {
        tokio::time::sleep(self.latency).await;

        let size = options.bytes.len() as u64;
        self.with_bucket(&options.bucket, |objects| {
            objects.insert(
                options.path.clone(),
                StoredObject {
                    bytes: options.bytes.clone(),
                    updated_at: chrono::Utc::now().to_rfc3339(),
                },
            );
            Ok(())
        })?;

        if let Some(progress) = &options.progress {
            for pct in PROGRESS_STEPS {
                progress(pct);
            }
        }

        Ok(UploadResult {
            url: self.public_url(&options.bucket, &options.path),
            path: options.path,
            size,
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{BASE_URL}/object/public/{bucket}/{path}")
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Option<u64>,
    ) -> ServiceResult<String> {
        tokio::time::sleep(self.latency).await;
        let ttl = expires_in.unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS);
        self.with_bucket(bucket, |objects| {
            if !objects.contains_key(path) {
                return Err(ServiceError::NotFound(format!("{bucket}/{path}")));
            }
            Ok(format!(
                "{BASE_URL}/object/sign/{bucket}/{path}?token=mock&expires_in={ttl}"
            ))
        })
    }

    async fn download(&self, bucket: &str, path: &str) -> ServiceResult<Vec<u8>> {
        tokio::time::sleep(self.latency).await;
        self.with_bucket(bucket, |objects| {
            objects
                .get(path)
                .map(|o| o.bytes.clone())
                .ok_or_else(|| ServiceError::NotFound(format!("{bucket}/{path}")))
        })
    }

    async fn list(&self, bucket: &str, prefix: &str) -> ServiceResult<Vec<StorageObject>> {
        tokio::time::sleep(self.latency).await;
        self.with_bucket(bucket, |objects| {
            let mut listed: Vec<StorageObject> = objects
                .iter()
                .filter(|(path, _)| path.starts_with(prefix))
                .map(|(path, object)| StorageObject {
                    path: path.clone(),
                    size: object.bytes.len() as u64,
                    updated_at: Some(object.updated_at.clone()),
                })
                .collect();
            listed.sort_by(|a, b| a.path.cmp(&b.path));
            Ok(listed)
        })
    }

    async fn delete(&self, bucket: &str, path: &str) -> ServiceResult<()> {
        tokio::time::sleep(self.latency).await;
        self.with_bucket(bucket, |objects| {
            objects
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| ServiceError::NotFound(format!("{bucket}/{path}")))
        })
    }

    async fn move_object(&self, bucket: &str, from: &str, to: &str) -> ServiceResult<()> {
        tokio::time::sleep(self.latency).await;
        self.with_bucket(bucket, |objects| {
            let object = objects
                .remove(from)
                .ok_or_else(|| ServiceError::NotFound(format!("{bucket}/{from}")))?;
            objects.insert(to.to_string(), object);
            Ok(())
        })
    }

    async fn copy_object(&self, bucket: &str, from: &str, to: &str) -> ServiceResult<()> {
        tokio::time::sleep(self.latency).await;
        self.with_bucket(bucket, |objects| {
            let object = objects
                .get(from)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound(format!("{bucket}/{from}")))?;
            objects.insert(to.to_string(), object);
            Ok(())
        })
    }

    async fn create_bucket(&self, name: &str, _public: bool) -> ServiceResult<()> {
        tokio::time::sleep(self.latency).await;
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if buckets.contains_key(name) {
            return Err(ServiceError::Unknown(format!(
                "bucket already exists: {name}"
            )));
        }
        buckets.insert(name.to_string(), HashMap::new());
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> ServiceResult<()> {
        tokio::time::sleep(self.latency).await;
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        buckets
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(format!("bucket {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    #[tokio::test]
    async fn test_upload_download_roundtrip() {
        let storage = MockStorageService::new();
        let result = storage
            .upload(
                UploadOptions::new("media", "bhajans/aarti.mp3", b"om".to_vec())
                    .with_content_type("audio/mpeg"),
            )
            .await
            .unwrap();

        assert_eq!(result.size, 2);
        assert_eq!(result.path, "bhajans/aarti.mp3");
        assert!(result.url.contains("/object/public/media/"));

        let bytes = storage.download("media", "bhajans/aarti.mp3").await.unwrap();
        assert_eq!(bytes, b"om");
    }

    #[tokio::test]
    async fn test_upload_progress_is_monotonic_and_ends_at_100() {
        let storage = MockStorageService::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        storage
            .upload(
                UploadOptions::new("media", "covers/gita.png", vec![0u8; 64]).with_progress(
                    Box::new(move |pct| {
                        seen_clone.lock().unwrap().push(pct);
                    }),
                ),
            )
            .await
            .unwrap();

        let percentages = seen.lock().unwrap().clone();
        assert!(!percentages.is_empty());
        assert!(percentages.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*percentages.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn test_unknown_bucket_is_not_found() {
        let storage = MockStorageService::new();
        let err = storage
            .upload(UploadOptions::new("ghost", "a.txt", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn test_list_filters_by_prefix() {
        let storage = MockStorageService::new();
        for path in ["covers/a.png", "covers/b.png", "audio/c.mp3"] {
            storage
                .upload(UploadOptions::new("media", path, vec![1]))
                .await
                .unwrap();
        }

        let covers = storage.list("media", "covers/").await.unwrap();
        assert_eq!(covers.len(), 2);
        assert_eq!(covers[0].path, "covers/a.png");
    }

    #[tokio::test]
    async fn test_move_and_copy() {
        let storage = MockStorageService::new();
        storage
            .upload(UploadOptions::new("media", "a.txt", b"x".to_vec()))
            .await
            .unwrap();

        storage.copy_object("media", "a.txt", "b.txt").await.unwrap();
        assert_eq!(storage.download("media", "a.txt").await.unwrap(), b"x");
        assert_eq!(storage.download("media", "b.txt").await.unwrap(), b"x");

        storage.move_object("media", "a.txt", "c.txt").await.unwrap();
        assert!(storage.download("media", "a.txt").await.is_err());
        assert_eq!(storage.download("media", "c.txt").await.unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_signed_url_defaults_expiry() {
        let storage = MockStorageService::new();
        storage
            .upload(UploadOptions::new("media", "a.txt", b"x".to_vec()))
            .await
            .unwrap();

        let url = storage.signed_url("media", "a.txt", None).await.unwrap();
        assert!(url.contains("expires_in=3600"));

        let custom = storage
            .signed_url("media", "a.txt", Some(60))
            .await
            .unwrap();
        assert!(custom.contains("expires_in=60"));
    }

    #[tokio::test]
    async fn test_bucket_lifecycle() {
        let storage = MockStorageService::new();
        storage.create_bucket("covers", true).await.unwrap();
        assert!(storage.create_bucket("covers", true).await.is_err());

        storage.delete_bucket("covers").await.unwrap();
        let err = storage.delete_bucket("covers").await.unwrap_err();
        assert_eq!(err.code(), "not_found");
    }
}
