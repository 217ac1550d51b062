//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from core data

use chrono::{DateTime, Utc};
use rooranking_core::{
    AddedArtists as CoreAddedArtists, ArtistAggregate as CoreArtistAggregate, ArtistData,
    AvatarWithUrl, GroupData, QuestionnaireData, SessionData, UserData,
};
use serde::Serialize;
use utoipa::ToSchema;

/// The envelope for operations whose failures are user-correctable. Callers
/// check `success` instead of the status code.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: i32,
    username: String,
    is_admin: bool,
    avatar: Avatar,
    created_at: DateTime<Utc>,
    years_attended: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    questionnaire: Option<Questionnaire>,
    onboarding_complete: bool,
}

/// What a user shows up as: an uploaded image, or a plain color
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Avatar {
    Color {
        color: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        storage_id: String,
    },
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    favorite_year: Option<String>,
    memorable_set: Option<String>,
    worst_set: Option<String>,
    favorite_vendor: Option<String>,
    camp_essential: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl LoginResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            token: None,
            user: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RegisterResult {
    pub fn success(user: User) -> Self {
        Self {
            success: true,
            user: Some(user),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Artist {
    id: i32,
    name: String,
    year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddedArtists {
    added: Vec<String>,
    skipped: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    id: i32,
    name: String,
    year: i32,
    artist_ids: Vec<i32>,
    /// `"current"`, `"next"`, or null
    status: Option<String>,
    order: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistAggregate {
    artist_id: i32,
    name: String,
    /// Null when nobody rated the artist
    avg_score: Option<f64>,
    rating_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRecord {
    id: i32,
    storage_id: String,
    name: String,
    url: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadUrlResult {
    url: String,
}

impl UploadUrlResult {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        let avatar = match &self.avatar_image {
            Some(storage_id) => Avatar::Image {
                storage_id: storage_id.clone(),
            },
            None => Avatar::Color {
                color: self.avatar_color.clone(),
            },
        };

        User {
            id: self.id,
            username: self.username.clone(),
            is_admin: self.is_admin,
            avatar,
            created_at: self.created_at,
            years_attended: self.years_attended.clone(),
            questionnaire: self.questionnaire.as_ref().map(|q| q.to_serialized()),
            onboarding_complete: self.onboarding_complete,
        }
    }
}

impl ToSerialized<Questionnaire> for QuestionnaireData {
    fn to_serialized(&self) -> Questionnaire {
        Questionnaire {
            favorite_year: self.favorite_year.clone(),
            memorable_set: self.memorable_set.clone(),
            worst_set: self.worst_set.clone(),
            favorite_vendor: self.favorite_vendor.clone(),
            camp_essential: self.camp_essential.clone(),
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            success: true,
            token: Some(self.token.clone()),
            user: Some(self.user.to_serialized()),
            error: None,
        }
    }
}

impl ToSerialized<Artist> for ArtistData {
    fn to_serialized(&self) -> Artist {
        Artist {
            id: self.id,
            name: self.name.clone(),
            year: self.year,
        }
    }
}

impl ToSerialized<AddedArtists> for CoreAddedArtists {
    fn to_serialized(&self) -> AddedArtists {
        AddedArtists {
            added: self.added.clone(),
            skipped: self.skipped.clone(),
        }
    }
}

impl ToSerialized<Group> for GroupData {
    fn to_serialized(&self) -> Group {
        Group {
            id: self.id,
            name: self.name.clone(),
            year: self.year,
            artist_ids: self.artist_ids.clone(),
            status: self.status.map(|s| s.as_str().to_string()),
            order: self.order,
        }
    }
}

impl ToSerialized<ArtistAggregate> for CoreArtistAggregate {
    fn to_serialized(&self) -> ArtistAggregate {
        ArtistAggregate {
            artist_id: self.artist_id,
            name: self.name.clone(),
            avg_score: self.avg_score,
            rating_count: self.rating_count,
        }
    }
}

impl ToSerialized<AvatarRecord> for AvatarWithUrl {
    fn to_serialized(&self) -> AvatarRecord {
        AvatarRecord {
            id: self.avatar.id,
            storage_id: self.avatar.storage_id.clone(),
            name: self.avatar.name.clone(),
            url: self.url.clone(),
            created_at: self.avatar.created_at,
        }
    }
}
