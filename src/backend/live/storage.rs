use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::backend::live::client::BackendClient;
use crate::error::ServiceResult;
use crate::services::storage_service::{
    StorageObject, StorageService, UploadOptions, UploadResult, DEFAULT_SIGNED_URL_TTL_SECS,
};

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
    updated_at: Option<String>,
    #[serde(default)]
    metadata: Option<ObjectMetadata>,
}

#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    #[serde(default)]
    size: u64,
}

/// Blob storage over `/storage/v1`. The request is sent in one piece, so the
/// progress callback only reports completion.
pub struct LiveStorageService {
    client: Arc<BackendClient>,
}

impl LiveStorageService {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    fn object_path(bucket: &str, path: &str) -> String {
        format!("storage/v1/object/{bucket}/{path}")
    }
}

#[async_trait]
impl StorageService for LiveStorageService {
    async fn upload(&self, options: UploadOptions) -> ServiceResult<UploadResult> {
        let size = options.bytes.len() as u64;
        self.client
            .post_bytes(
                &Self::object_path(&options.bucket, &options.path),
                options.bytes,
                options.content_type.as_deref(),
            )
            .await?;

        if let Some(progress) = &options.progress {
            progress(100);
        }

        Ok(UploadResult {
            url: self.public_url(&options.bucket, &options.path),
            path: options.path,
            size,
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.client
            .url(&format!("storage/v1/object/public/{bucket}/{path}"))
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Option<u64>,
    ) -> ServiceResult<String> {
        let ttl = expires_in.unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS);
        let response: SignedUrlResponse = self
            .client
            .post_json(
                &format!("storage/v1/object/sign/{bucket}/{path}"),
                &json!({ "expiresIn": ttl }),
            )
            .await?;
        Ok(self
            .client
            .url(&format!("storage/v1{}", response.signed_url)))
    }

    async fn download(&self, bucket: &str, path: &str) -> ServiceResult<Vec<u8>> {
        self.client.get_bytes(&Self::object_path(bucket, path)).await
    }

    async fn list(&self, bucket: &str, prefix: &str) -> ServiceResult<Vec<StorageObject>> {
        let objects: Vec<ListedObject> = self
            .client
            .post_json(
                &format!("storage/v1/object/list/{bucket}"),
                &json!({ "prefix": prefix }),
            )
            .await?;

        Ok(objects
            .into_iter()
            .map(|o| StorageObject {
                size: o.metadata.as_ref().map(|m| m.size).unwrap_or(0),
                path: o.name,
                updated_at: o.updated_at,
            })
            .collect())
    }

    async fn delete(&self, bucket: &str, path: &str) -> ServiceResult<()> {
        self.client.delete(&Self::object_path(bucket, path)).await
    }

    async fn move_object(&self, bucket: &str, from: &str, to: &str) -> ServiceResult<()> {
        self.client
            .post_no_content(
                "storage/v1/object/move",
                &json!({
                    "bucketId": bucket,
                    "sourceKey": from,
                    "destinationKey": to,
                }),
            )
            .await
    }

    async fn copy_object(&self, bucket: &str, from: &str, to: &str) -> ServiceResult<()> {
        self.client
            .post_no_content(
                "storage/v1/object/copy",
                &json!({
                    "bucketId": bucket,
                    "sourceKey": from,
                    "destinationKey": to,
                }),
            )
            .await
    }

    async fn create_bucket(&self, name: &str, public: bool) -> ServiceResult<()> {
        self.client
            .post_no_content("storage/v1/bucket", &json!({ "name": name, "public": public }))
            .await
    }

    async fn delete_bucket(&self, name: &str) -> ServiceResult<()> {
        self.client.delete(&format!("storage/v1/bucket/{name}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_shape() {
        let client = Arc::new(BackendClient::new("https://api.bhakti.app", "anon"));
        let storage = LiveStorageService::new(client);
        assert_eq!(
            storage.public_url("media", "covers/gita.png"),
            "https://api.bhakti.app/storage/v1/object/public/media/covers/gita.png"
        );
    }

    #[test]
    fn test_listed_object_metadata_is_optional() {
        let raw = r#"[{"name": "covers/gita.png", "updated_at": null}]"#;
        let objects: Vec<ListedObject> = serde_json::from_str(raw).unwrap();
        assert_eq!(objects[0].name, "covers/gita.png");
        assert!(objects[0].metadata.is_none());
    }
}
