use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

impl DatabaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Represents a type that can fetch and mutate Roo Ranking data.
///
/// Uniqueness (usernames, session tokens, artist name within a year, one
/// ranking per user and artist, setting keys) is the implementation's
/// responsibility, as is making `upsert_ranking` and `upsert_setting` atomic
/// per call so two concurrent upserts for one logical key never produce two
/// rows.
#[async_trait]
pub trait Database: Send + Sync + 'static {
    async fn check_for_admin(&self) -> Result<bool>;
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    async fn user_by_username(&self, username: &str) -> Result<UserData>;
    async fn list_users(&self) -> Result<Vec<UserData>>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;
    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData>;
    async fn update_user_password(&self, user_id: PrimaryKey, password: String) -> Result<()>;
    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()>;

    async fn session_by_token(&self, token: &str) -> Result<SessionData>;
    async fn create_session(&self, new_session: NewSession) -> Result<SessionData>;
    async fn delete_session_by_token(&self, token: &str) -> Result<()>;
    async fn delete_sessions_by_user(&self, user_id: PrimaryKey) -> Result<()>;

    async fn artist_by_id(&self, artist_id: PrimaryKey) -> Result<ArtistData>;
    async fn artist_by_name_and_year(&self, name: &str, year: i32) -> Result<ArtistData>;
    async fn artists_by_year(&self, year: i32) -> Result<Vec<ArtistData>>;
    /// All years that have artists, most recent first
    async fn artist_years(&self) -> Result<Vec<i32>>;
    async fn create_artist(&self, new_artist: NewArtist) -> Result<ArtistData>;
    async fn delete_artist(&self, artist_id: PrimaryKey) -> Result<()>;

    async fn group_by_id(&self, group_id: PrimaryKey) -> Result<GroupData>;
    /// Groups of a year, sorted by their insertion order
    async fn groups_by_year(&self, year: i32) -> Result<Vec<GroupData>>;
    async fn create_group(&self, new_group: NewGroup) -> Result<GroupData>;
    async fn update_group(&self, updated_group: UpdatedGroup) -> Result<GroupData>;
    async fn delete_group(&self, group_id: PrimaryKey) -> Result<()>;
    /// Clears `status` from every group of the year currently holding it
    async fn clear_group_status(&self, year: i32, status: GroupStatus) -> Result<()>;
    /// Removes the artist id from every group's member list
    async fn prune_artist_from_groups(&self, artist_id: PrimaryKey) -> Result<()>;

    async fn upsert_ranking(
        &self,
        user_id: PrimaryKey,
        artist_id: PrimaryKey,
        score: i32,
        updated_at: DateTime<Utc>,
    ) -> Result<RankingData>;
    async fn delete_ranking(&self, user_id: PrimaryKey, artist_id: PrimaryKey) -> Result<()>;
    async fn rankings_by_user(&self, user_id: PrimaryKey) -> Result<Vec<RankingData>>;
    async fn rankings_by_artist(&self, artist_id: PrimaryKey) -> Result<Vec<RankingData>>;
    async fn delete_rankings_by_user(&self, user_id: PrimaryKey) -> Result<()>;
    async fn delete_rankings_by_artist(&self, artist_id: PrimaryKey) -> Result<()>;

    async fn setting_by_key(&self, key: &str) -> Result<SettingData>;
    async fn upsert_setting(&self, key: &str, value: serde_json::Value) -> Result<SettingData>;

    async fn avatar_by_id(&self, avatar_id: PrimaryKey) -> Result<AvatarData>;
    async fn list_avatars(&self) -> Result<Vec<AvatarData>>;
    async fn create_avatar(&self, new_avatar: NewAvatar) -> Result<AvatarData>;
    async fn update_avatar_name(&self, avatar_id: PrimaryKey, name: String) -> Result<AvatarData>;
    async fn delete_avatar(&self, avatar_id: PrimaryKey) -> Result<()>;
}
