use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// A Roo Ranking account
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: PrimaryKey,
    pub username: String,
    /// The salted password hash, never the plain password
    pub password: String,
    pub is_admin: bool,
    /// Hex color shown when no avatar image is set
    pub avatar_color: String,
    /// Storage reference of an uploaded avatar image, if any
    pub avatar_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub years_attended: Vec<i32>,
    pub questionnaire: Option<QuestionnaireData>,
    pub onboarding_complete: bool,
}

/// Answers collected by the onboarding questionnaire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireData {
    pub favorite_year: Option<String>,
    pub memorable_set: Option<String>,
    pub worst_set: Option<String>,
    pub favorite_vendor: Option<String>,
    pub camp_essential: Option<String>,
}

/// Login session data for authentication
#[derive(Debug, Clone)]
pub struct SessionData {
    pub id: PrimaryKey,
    /// The session token, or key if you will
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// The user that is logged in
    pub user: UserData,
}

/// A festival artist for a specific year
#[derive(Debug, Clone)]
pub struct ArtistData {
    pub id: PrimaryKey,
    pub name: String,
    pub year: i32,
}

/// A named, ordered grouping of artists within a year
#[derive(Debug, Clone)]
pub struct GroupData {
    pub id: PrimaryKey,
    pub name: String,
    pub year: i32,
    /// Weak references into the artists collection
    pub artist_ids: Vec<PrimaryKey>,
    pub status: Option<GroupStatus>,
    /// Insertion sequence within the year
    pub order: i32,
}

/// Exclusive per-year group markers.
/// At most one group per year holds each of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Current,
    Next,
}

impl GroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Next => "next",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "current" => Some(Self::Current),
            "next" => Some(Self::Next),
            _ => None,
        }
    }
}

/// A single user's score for a single artist
#[derive(Debug, Clone)]
pub struct RankingData {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub artist_id: PrimaryKey,
    pub score: i32,
    pub updated_at: DateTime<Utc>,
}

/// A key-value setting row
#[derive(Debug, Clone)]
pub struct SettingData {
    pub id: PrimaryKey,
    pub key: String,
    pub value: serde_json::Value,
}

/// An uploaded avatar image in the admin-curated gallery.
/// The file itself lives with the storage provider.
#[derive(Debug, Clone)]
pub struct AvatarData {
    pub id: PrimaryKey,
    pub storage_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub avatar_color: String,
    pub avatar_image: Option<String>,
    pub years_attended: Vec<i32>,
    pub questionnaire: Option<QuestionnaireData>,
    pub onboarding_complete: bool,
}

#[derive(Debug, Default)]
pub struct UpdatedUser {
    pub id: PrimaryKey,
    pub avatar_color: Option<String>,
    /// `Some(None)` clears the image, reverting the avatar to its color
    pub avatar_image: Option<Option<String>>,
    pub years_attended: Option<Vec<i32>>,
    pub questionnaire: Option<QuestionnaireData>,
    pub onboarding_complete: Option<bool>,
}

#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub user_id: PrimaryKey,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewArtist {
    pub name: String,
    pub year: i32,
}

#[derive(Debug)]
pub struct NewGroup {
    pub name: String,
    pub year: i32,
    pub artist_ids: Vec<PrimaryKey>,
    pub status: Option<GroupStatus>,
}

/// A full replacement of a group's mutable fields
#[derive(Debug)]
pub struct UpdatedGroup {
    pub id: PrimaryKey,
    pub name: String,
    pub artist_ids: Vec<PrimaryKey>,
    pub status: Option<GroupStatus>,
}

#[derive(Debug)]
pub struct NewAvatar {
    pub storage_id: String,
    pub name: String,
}
