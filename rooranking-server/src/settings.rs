use axum::{extract::State, routing::get, Json};

use crate::{
    auth::AdminSession,
    context::ServerContext,
    errors::ServerResult,
    schemas::{SetActiveYearSchema, ValidatedJson},
    serialized::ActionResult,
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/settings/active-year",
    tag = "settings",
    responses(
        (status = 200, body = i32, description = "The festival year shown by default")
    )
)]
pub(crate) async fn active_year(State(context): State<ServerContext>) -> ServerResult<Json<i32>> {
    let year = context.festival.settings.active_year().await?;

    Ok(Json(year))
}

#[utoipa::path(
    put,
    path = "/v1/settings/active-year",
    tag = "settings",
    request_body = SetActiveYearSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn set_active_year(
    _session: AdminSession,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<SetActiveYearSchema>,
) -> ServerResult<Json<ActionResult>> {
    context.festival.settings.set_active_year(body.year).await?;

    Ok(Json(ActionResult::ok()))
}

pub fn router() -> Router {
    Router::new().route("/active-year", get(active_year).put(set_active_year))
}
