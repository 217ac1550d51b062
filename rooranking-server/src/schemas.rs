use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use rooranking_core::{GroupStatus, QuestionnaireData};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Password minimums are deliberately not validated here. A too-short
/// password must come back as a `{success: false}` result from the
/// operation, not as a rejected request body.
#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(length(max = 128))]
    pub username: String,
    #[validate(length(max = 64))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterSchema {
    #[validate(length(min = 2, max = 128))]
    pub username: String,
    #[validate(length(max = 64))]
    pub password: String,
    #[validate(length(max = 32))]
    pub avatar_color: String,
    pub avatar_image: Option<String>,
    #[serde(default)]
    pub years_attended: Vec<i32>,
    pub questionnaire: Option<QuestionnaireSchema>,
}

#[derive(Debug, Clone, ToSchema, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuestionnaireSchema {
    pub favorite_year: Option<String>,
    pub memorable_set: Option<String>,
    pub worst_set: Option<String>,
    pub favorite_vendor: Option<String>,
    pub camp_essential: Option<String>,
}

impl From<QuestionnaireSchema> for QuestionnaireData {
    fn from(value: QuestionnaireSchema) -> Self {
        Self {
            favorite_year: value.favorite_year,
            memorable_set: value.memorable_set,
            worst_set: value.worst_set,
            favorite_vendor: value.favorite_vendor,
            camp_essential: value.camp_essential,
        }
    }
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePasswordSchema {
    #[validate(length(max = 64))]
    pub current_password: String,
    #[validate(length(max = 64))]
    pub new_password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResetPasswordSchema {
    #[validate(length(max = 64))]
    pub new_password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserSchema {
    #[validate(length(min = 2, max = 128))]
    pub username: String,
    #[validate(length(max = 64))]
    pub password: String,
    #[validate(length(max = 32))]
    pub avatar_color: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateColorSchema {
    #[validate(length(min = 1, max = 32))]
    pub avatar_color: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetUserAvatarSchema {
    #[validate(length(min = 1, max = 256))]
    pub storage_id: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddArtistsSchema {
    /// One entry per submitted line; blanks are dropped by the operation
    #[validate(length(min = 1))]
    pub names: Vec<String>,
    pub year: i32,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewGroupSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub artist_ids: Vec<i32>,
    pub status: Option<GroupStatusSchema>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateGroupSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    pub artist_ids: Vec<i32>,
    pub status: Option<GroupStatusSchema>,
}

#[derive(Debug, Clone, Copy, ToSchema, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatusSchema {
    Current,
    Next,
}

impl From<GroupStatusSchema> for GroupStatus {
    fn from(value: GroupStatusSchema) -> Self {
        match value {
            GroupStatusSchema::Current => Self::Current,
            GroupStatusSchema::Next => Self::Next,
        }
    }
}

/// Score bounds are checked by the operation so violations surface as soft
/// results, matching the password rule above
#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetRankingSchema {
    pub score: i32,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaveAvatarSchema {
    #[validate(length(min = 1, max = 256))]
    pub storage_id: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAvatarNameSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetActiveYearSchema {
    pub year: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct YearQuery {
    pub year: i32,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "JSON parse failed"))?;

        extracted_json
            .0
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body is invalid"))?;

        Ok(Self(extracted_json.0))
    }
}
