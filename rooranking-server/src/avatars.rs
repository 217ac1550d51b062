use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json,
};
use rooranking_core::UpdatedUser;

use crate::{
    auth::{AdminSession, Session},
    context::ServerContext,
    errors::ServerResult,
    schemas::{SaveAvatarSchema, SetUserAvatarSchema, UpdateAvatarNameSchema, ValidatedJson},
    serialized::{ActionResult, AvatarRecord, ToSerialized, UploadUrlResult},
    Router,
};

#[utoipa::path(
    post,
    path = "/v1/avatars/upload-url",
    tag = "avatars",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = UploadUrlResult, description = "A one-off URL to upload the image to")
    )
)]
pub(crate) async fn generate_upload_url(
    _session: AdminSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<UploadUrlResult>> {
    let upload = context.festival.avatars.generate_upload_url().await?;

    Ok(Json(UploadUrlResult::new(upload.url)))
}

#[utoipa::path(
    post,
    path = "/v1/avatars",
    tag = "avatars",
    request_body = SaveAvatarSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn save_avatar(
    _session: AdminSession,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<SaveAvatarSchema>,
) -> ServerResult<Json<ActionResult>> {
    context
        .festival
        .avatars
        .save_avatar(body.storage_id, body.name)
        .await?;

    Ok(Json(ActionResult::ok()))
}

#[utoipa::path(
    get,
    path = "/v1/avatars",
    tag = "avatars",
    responses(
        (status = 200, body = Vec<AvatarRecord>)
    )
)]
pub(crate) async fn list_avatars(
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<AvatarRecord>>> {
    let avatars = context.festival.avatars.list_avatars().await?;

    Ok(Json(avatars.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/avatars/{id}",
    tag = "avatars",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn delete_avatar(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(avatar_id): Path<i32>,
) -> ServerResult<Json<ActionResult>> {
    let result = match context.festival.avatars.delete_avatar(avatar_id).await {
        Ok(()) => ActionResult::ok(),
        Err(e) if e.is_not_found() => ActionResult::error("Avatar not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    put,
    path = "/v1/avatars/{id}/name",
    tag = "avatars",
    request_body = UpdateAvatarNameSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn update_avatar_name(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(avatar_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateAvatarNameSchema>,
) -> ServerResult<Json<ActionResult>> {
    let renamed = context
        .festival
        .avatars
        .update_avatar_name(avatar_id, body.name)
        .await;

    let result = match renamed {
        Ok(_) => ActionResult::ok(),
        Err(e) if e.is_not_found() => ActionResult::error("Avatar not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/v1/avatars/url/{storageId}",
    tag = "avatars",
    responses(
        (status = 200, body = String, description = "The download URL for a stored image")
    )
)]
pub(crate) async fn avatar_url(
    State(context): State<ServerContext>,
    Path(storage_id): Path<String>,
) -> ServerResult<Json<String>> {
    let url = context.festival.avatars.avatar_url(&storage_id).await?;

    Ok(Json(url))
}

#[utoipa::path(
    put,
    path = "/v1/avatars/me",
    tag = "avatars",
    request_body = SetUserAvatarSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn set_own_avatar(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<SetUserAvatarSchema>,
) -> ServerResult<Json<ActionResult>> {
    context
        .festival
        .auth
        .update_user(UpdatedUser {
            id: session.user().id,
            avatar_image: Some(Some(body.storage_id)),
            ..Default::default()
        })
        .await?;

    Ok(Json(ActionResult::ok()))
}

#[utoipa::path(
    delete,
    path = "/v1/avatars/me",
    tag = "avatars",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult, description = "Reverts the avatar to its color")
    )
)]
pub(crate) async fn clear_own_avatar(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<ActionResult>> {
    context
        .festival
        .auth
        .update_user(UpdatedUser {
            id: session.user().id,
            avatar_image: Some(None),
            ..Default::default()
        })
        .await?;

    Ok(Json(ActionResult::ok()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_avatars).post(save_avatar))
        .route("/upload-url", post(generate_upload_url))
        .route("/url/:storage_id", get(avatar_url))
        .route("/me", put(set_own_avatar).delete(clear_own_avatar))
        .route("/:id", axum::routing::delete(delete_avatar))
        .route("/:id/name", put(update_avatar_name))
}
