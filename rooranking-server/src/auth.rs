use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    routing::{get, post},
    Json,
};
use rooranking_core::{AuthError, Credentials, NewRegistration, SessionData, UserData};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{ChangePasswordSchema, LoginSchema, RegisterSchema, ValidatedJson},
    serialized::{ActionResult, LoginResult, RegisterResult, ToSerialized, User},
    Router,
};

/// Wraps [SessionData] so [FromRequestParts] can be implemented for it
pub struct Session(SessionData);

impl Session {
    /// Returns the user of the session
    pub fn user(&self) -> &UserData {
        &self.0.user
    }
}

/// Like [Session], but only admits users with the admin flag. Identity is
/// always resolved from the token, never from request arguments.
pub struct AdminSession(SessionData);

impl AdminSession {
    pub fn user(&self) -> &UserData {
        &self.0.user
    }
}

pub(crate) fn token_from_headers(
    headers: &HeaderMap,
) -> Result<&str, (StatusCode, &'static str)> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|x| x.to_str().ok())
        .ok_or((StatusCode::UNAUTHORIZED, "Missing authorization"))?;

    let parts: Vec<_> = token.split_ascii_whitespace().collect();

    if parts.first() != Some(&"Bearer") {
        return Err((StatusCode::BAD_REQUEST, "Authorization must be Bearer"));
    }

    Ok(parts.last().copied().unwrap_or_default())
}

#[async_trait]
impl FromRequestParts<ServerContext> for Session {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);
        let token = token_from_headers(&parts.headers)?;

        let session = context
            .festival
            .auth
            .session(token)
            .await
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Session does not exist"))?;

        Ok(Self(session))
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for AdminSession {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);
        let token = token_from_headers(&parts.headers)?;

        let session = context
            .festival
            .auth
            .require_admin(token)
            .await
            .map_err(|e| match e {
                AuthError::AdminRequired => (StatusCode::FORBIDDEN, "Admin access required"),
                _ => (StatusCode::UNAUTHORIZED, "Session does not exist"),
            })?;

        Ok(Self(session))
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterSchema,
    responses(
        (status = 200, body = RegisterResult)
    )
)]
pub(crate) async fn register(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> ServerResult<Json<RegisterResult>> {
    let registration = NewRegistration {
        username: body.username,
        password: body.password,
        avatar_color: body.avatar_color,
        avatar_image: body.avatar_image,
        years_attended: body.years_attended,
        questionnaire: body.questionnaire.map(Into::into),
    };

    let result = match context.festival.auth.register(registration).await {
        Ok(user) => RegisterResult::success(user.to_serialized()),
        Err(e @ (AuthError::UsernameTaken | AuthError::PasswordTooShort(_))) => {
            RegisterResult::failure(e.to_string())
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginSchema,
    responses(
        (status = 200, body = LoginResult)
    )
)]
pub(crate) async fn login(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<Json<LoginResult>> {
    let credentials = Credentials {
        username: body.username,
        password: body.password,
    };

    let result = match context.festival.auth.login(credentials).await {
        Ok(session) => session.to_serialized(),
        Err(e @ AuthError::InvalidCredentials) => LoginResult::failure(e.to_string()),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn logout(
    State(context): State<ServerContext>,
    headers: HeaderMap,
) -> Result<Json<ActionResult>, (StatusCode, &'static str)> {
    // The raw token is used here so logging out an expired session works too
    let token = token_from_headers(&headers)?;

    context
        .festival
        .auth
        .logout(token)
        .await
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Logout failed"))?;

    Ok(Json(ActionResult::ok()))
}

#[utoipa::path(
    get,
    path = "/v1/auth/user",
    tag = "auth",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = User)
    )
)]
pub(crate) async fn user(session: Session) -> Json<User> {
    Json(session.user().to_serialized())
}

#[utoipa::path(
    post,
    path = "/v1/auth/password",
    tag = "auth",
    request_body = ChangePasswordSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn change_password(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<ChangePasswordSchema>,
) -> ServerResult<Json<ActionResult>> {
    let change = context
        .festival
        .auth
        .change_password(session.user().id, &body.current_password, body.new_password)
        .await;

    let result = match change {
        Ok(()) => ActionResult::ok(),
        Err(e @ (AuthError::InvalidCurrentPassword | AuthError::PasswordTooShort(_))) => {
            ActionResult::error(e.to_string())
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(user))
        .route("/password", post(change_password))
}
