use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// A signed upload URL minted by the storage provider. The client uploads
/// the file bytes directly to this URL; they never pass through here.
#[derive(Debug, Clone)]
pub struct UploadUrl {
    pub url: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage provider request failed: {0}")]
    Provider(String),
}

/// Represents an external file-storage provider with a signed-URL upload
/// protocol. Only references move across this boundary.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Mints a one-off URL the client can upload a file to
    async fn generate_upload_url(&self) -> Result<UploadUrl, StorageError>;
    /// Resolves a stored object to a URL it can be fetched from
    async fn object_url(&self, storage_id: &str) -> Result<String, StorageError>;
    /// Removes the stored object. Deleting an object that is already gone is
    /// not an error.
    async fn delete_object(&self, storage_id: &str) -> Result<(), StorageError>;
}

/// A storage provider reached over HTTP
pub struct HttpStorage {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadUrlResponse {
    url: String,
}

impl HttpStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Storage for HttpStorage {
    async fn generate_upload_url(&self) -> Result<UploadUrl, StorageError> {
        let response = self
            .client
            .post(format!("{}/upload-urls", self.base_url))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| StorageError::Provider(e.to_string()))?;

        let body: UploadUrlResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Provider(e.to_string()))?;

        Ok(UploadUrl { url: body.url })
    }

    async fn object_url(&self, storage_id: &str) -> Result<String, StorageError> {
        Ok(format!("{}/files/{}", self.base_url, storage_id))
    }

    async fn delete_object(&self, storage_id: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(format!("{}/files/{}", self.base_url, storage_id))
            .send()
            .await
            .map_err(|e| StorageError::Provider(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        response
            .error_for_status()
            .map_err(|e| StorageError::Provider(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// A storage double that records deletions and mints predictable URLs
    #[derive(Default)]
    pub struct MemoryStorage {
        minted: Mutex<u32>,
        pub deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn generate_upload_url(&self) -> Result<UploadUrl, StorageError> {
            let mut minted = self.minted.lock();
            *minted += 1;

            Ok(UploadUrl {
                url: format!("memory://uploads/{minted}"),
            })
        }

        async fn object_url(&self, storage_id: &str) -> Result<String, StorageError> {
            Ok(format!("memory://files/{storage_id}"))
        }

        async fn delete_object(&self, storage_id: &str) -> Result<(), StorageError> {
            self.deleted.lock().push(storage_id.to_string());
            Ok(())
        }
    }
}
