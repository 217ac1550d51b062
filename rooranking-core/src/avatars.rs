use std::sync::Arc;

use thiserror::Error;

use crate::{
    AvatarData, Database, DatabaseError, NewAvatar, PrimaryKey, Storage, StorageError, UploadUrl,
};

/// The admin-curated gallery of uploaded avatar images. Records live in the
/// database; the files themselves live with the storage provider.
pub struct Avatars {
    db: Arc<dyn Database>,
    storage: Arc<dyn Storage>,
}

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error(transparent)]
    Db(#[from] DatabaseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AvatarError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Db(e) if e.is_not_found())
    }
}

/// An avatar record together with its resolved download URL
#[derive(Debug, Clone)]
pub struct AvatarWithUrl {
    pub avatar: AvatarData,
    pub url: String,
}

impl Avatars {
    pub fn new(db: &Arc<dyn Database>, storage: &Arc<dyn Storage>) -> Self {
        Self {
            db: db.clone(),
            storage: storage.clone(),
        }
    }

    /// Mints a signed URL for the client to upload a new image to
    pub async fn generate_upload_url(&self) -> Result<UploadUrl, AvatarError> {
        Ok(self.storage.generate_upload_url().await?)
    }

    /// Records an uploaded image in the gallery
    pub async fn save_avatar(
        &self,
        storage_id: String,
        name: String,
    ) -> Result<AvatarData, AvatarError> {
        let avatar = self.db.create_avatar(NewAvatar { storage_id, name }).await?;

        Ok(avatar)
    }

    /// The whole gallery, with resolved download URLs
    pub async fn list_avatars(&self) -> Result<Vec<AvatarWithUrl>, AvatarError> {
        let avatars = self.db.list_avatars().await?;
        let mut result = Vec::with_capacity(avatars.len());

        for avatar in avatars {
            let url = self.storage.object_url(&avatar.storage_id).await?;
            result.push(AvatarWithUrl { avatar, url });
        }

        Ok(result)
    }

    pub async fn update_avatar_name(
        &self,
        avatar_id: PrimaryKey,
        name: String,
    ) -> Result<AvatarData, AvatarError> {
        Ok(self.db.update_avatar_name(avatar_id, name).await?)
    }

    /// Deletes the stored file, then the gallery record
    pub async fn delete_avatar(&self, avatar_id: PrimaryKey) -> Result<(), AvatarError> {
        let avatar = self.db.avatar_by_id(avatar_id).await?;

        self.storage.delete_object(&avatar.storage_id).await?;
        self.db.delete_avatar(avatar_id).await?;

        Ok(())
    }

    /// Resolves any storage reference to a download URL
    pub async fn avatar_url(&self, storage_id: &str) -> Result<String, AvatarError> {
        Ok(self.storage.object_url(storage_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing::MemoryStorage, MemoryDatabase};

    fn setup() -> (Arc<MemoryStorage>, Avatars) {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        let memory_storage = Arc::new(MemoryStorage::default());
        let storage: Arc<dyn Storage> = memory_storage.clone();

        (memory_storage, Avatars::new(&db, &storage))
    }

    #[tokio::test]
    async fn saved_avatars_list_with_urls() {
        let (_, avatars) = setup();

        avatars
            .save_avatar("obj-1".to_string(), "Sunny".to_string())
            .await
            .unwrap();
        avatars
            .save_avatar("obj-2".to_string(), "Moody".to_string())
            .await
            .unwrap();

        let listed = avatars.list_avatars().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].avatar.name, "Sunny");
        assert_eq!(listed[0].url, "memory://files/obj-1");
    }

    #[tokio::test]
    async fn deleting_an_avatar_removes_the_stored_object_first() {
        let (storage, avatars) = setup();

        let avatar = avatars
            .save_avatar("obj-1".to_string(), "Sunny".to_string())
            .await
            .unwrap();

        avatars.delete_avatar(avatar.id).await.unwrap();

        assert_eq!(*storage.deleted.lock(), vec!["obj-1".to_string()]);
        assert!(avatars.list_avatars().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_missing_avatar_reports_not_found() {
        let (storage, avatars) = setup();

        let err = avatars.delete_avatar(42).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(storage.deleted.lock().is_empty());
    }

    #[tokio::test]
    async fn renaming_an_avatar() {
        let (_, avatars) = setup();

        let avatar = avatars
            .save_avatar("obj-1".to_string(), "Sunny".to_string())
            .await
            .unwrap();

        let renamed = avatars
            .update_avatar_name(avatar.id, "Stormy".to_string())
            .await
            .unwrap();

        assert_eq!(renamed.name, "Stormy");
    }
}
