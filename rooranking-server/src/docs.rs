use std::borrow::BorrowMut;

use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{schemas, serialized};

#[derive(OpenApi)]
#[openapi(
    modifiers(&Security),
    info(
        description = "rooranking-server exposes endpoints to interact with this Roo Ranking instance"
    ),
    paths(
        crate::auth::register,
        crate::auth::login,
        crate::auth::logout,
        crate::auth::user,
        crate::auth::change_password,
        crate::users::list_users,
        crate::users::create_user,
        crate::users::delete_user,
        crate::users::update_user_color,
        crate::users::reset_user_password,
        crate::users::set_user_avatar,
        crate::artists::artists_by_year,
        crate::artists::years,
        crate::artists::add_artists,
        crate::artists::delete_artist,
        crate::groups::groups_by_year,
        crate::groups::create_group,
        crate::groups::update_group,
        crate::groups::delete_group,
        crate::rankings::set_ranking,
        crate::rankings::clear_ranking,
        crate::rankings::user_rankings,
        crate::rankings::aggregate_rankings,
        crate::settings::active_year,
        crate::settings::set_active_year,
        crate::avatars::generate_upload_url,
        crate::avatars::save_avatar,
        crate::avatars::list_avatars,
        crate::avatars::delete_avatar,
        crate::avatars::update_avatar_name,
        crate::avatars::avatar_url,
        crate::avatars::set_own_avatar,
        crate::avatars::clear_own_avatar,
    ),
    components(schemas(
        serialized::ActionResult,
        serialized::User,
        serialized::Avatar,
        serialized::Questionnaire,
        serialized::LoginResult,
        serialized::RegisterResult,
        serialized::Artist,
        serialized::AddedArtists,
        serialized::Group,
        serialized::ArtistAggregate,
        serialized::AvatarRecord,
        serialized::UploadUrlResult,
        schemas::LoginSchema,
        schemas::RegisterSchema,
        schemas::QuestionnaireSchema,
        schemas::ChangePasswordSchema,
        schemas::ResetPasswordSchema,
        schemas::CreateUserSchema,
        schemas::UpdateColorSchema,
        schemas::SetUserAvatarSchema,
        schemas::AddArtistsSchema,
        schemas::NewGroupSchema,
        schemas::UpdateGroupSchema,
        schemas::GroupStatusSchema,
        schemas::SetRankingSchema,
        schemas::SaveAvatarSchema,
        schemas::UpdateAvatarNameSchema,
        schemas::SetActiveYearSchema,
    ))
)]
pub struct ApiDoc;

struct Security;

impl Modify for Security {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.borrow_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("Bearer <token>")
                .build();

            components.add_security_scheme("BearerAuth", SecurityScheme::Http(scheme))
        }
    }
}

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
