use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json,
};
use log::info;
use rooranking_core::{AuthError, UpdatedUser};

use crate::{
    auth::AdminSession,
    context::ServerContext,
    errors::ServerResult,
    schemas::{
        CreateUserSchema, ResetPasswordSchema, SetUserAvatarSchema, UpdateColorSchema,
        ValidatedJson,
    },
    serialized::{ActionResult, RegisterResult, ToSerialized, User},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "users",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<User>)
    )
)]
pub(crate) async fn list_users(
    _session: AdminSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<User>>> {
    let users = context.festival.auth.list_users().await?;

    Ok(Json(users.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "users",
    request_body = CreateUserSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = RegisterResult)
    )
)]
pub(crate) async fn create_user(
    _session: AdminSession,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<CreateUserSchema>,
) -> ServerResult<Json<RegisterResult>> {
    let created = context
        .festival
        .auth
        .create_user(body.username, body.password, body.avatar_color)
        .await;

    let result = match created {
        Ok(user) => RegisterResult::success(user.to_serialized()),
        Err(e @ (AuthError::UsernameTaken | AuthError::PasswordTooShort(_))) => {
            RegisterResult::failure(e.to_string())
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "users",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn delete_user(
    session: AdminSession,
    State(context): State<ServerContext>,
    Path(user_id): Path<i32>,
) -> ServerResult<Json<ActionResult>> {
    let result = match context.festival.auth.delete_user(user_id).await {
        Ok(()) => {
            info!("{} deleted user {user_id}.", session.user().username);
            ActionResult::ok()
        }
        Err(e) if e.is_not_found() => ActionResult::error("User not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}/color",
    tag = "users",
    request_body = UpdateColorSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn update_user_color(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(user_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateColorSchema>,
) -> ServerResult<Json<ActionResult>> {
    let updated = context
        .festival
        .auth
        .update_user(UpdatedUser {
            id: user_id,
            avatar_color: Some(body.avatar_color),
            ..Default::default()
        })
        .await;

    let result = match updated {
        Ok(_) => ActionResult::ok(),
        Err(e) if e.is_not_found() => ActionResult::error("User not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}/password",
    tag = "users",
    request_body = ResetPasswordSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn reset_user_password(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(user_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<ResetPasswordSchema>,
) -> ServerResult<Json<ActionResult>> {
    let reset = context
        .festival
        .auth
        .reset_password(user_id, body.new_password)
        .await;

    let result = match reset {
        Ok(()) => ActionResult::ok(),
        Err(e @ AuthError::PasswordTooShort(_)) => ActionResult::error(e.to_string()),
        Err(AuthError::Db(e)) if e.is_not_found() => ActionResult::error("User not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}/avatar",
    tag = "users",
    request_body = SetUserAvatarSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn set_user_avatar(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(user_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<SetUserAvatarSchema>,
) -> ServerResult<Json<ActionResult>> {
    let updated = context
        .festival
        .auth
        .update_user(UpdatedUser {
            id: user_id,
            avatar_image: Some(Some(body.storage_id)),
            ..Default::default()
        })
        .await;

    let result = match updated {
        Ok(_) => ActionResult::ok(),
        Err(e) if e.is_not_found() => ActionResult::error("User not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", delete(delete_user))
        .route("/:id/color", put(update_user_color))
        .route("/:id/password", put(reset_user_password))
        .route("/:id/avatar", put(set_user_avatar))
}
