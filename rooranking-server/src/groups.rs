use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Json,
};
use rooranking_core::{NewGroup, UpdatedGroup};

use crate::{
    auth::AdminSession,
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewGroupSchema, UpdateGroupSchema, ValidatedJson, YearQuery},
    serialized::{ActionResult, Group, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/groups",
    tag = "groups",
    params(YearQuery),
    responses(
        (status = 200, body = Vec<Group>, description = "Groups of the year in their insertion order")
    )
)]
pub(crate) async fn groups_by_year(
    State(context): State<ServerContext>,
    Query(query): Query<YearQuery>,
) -> ServerResult<Json<Vec<Group>>> {
    let groups = context.festival.lineup.groups_by_year(query.year).await?;

    Ok(Json(groups.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/groups",
    tag = "groups",
    request_body = NewGroupSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Group)
    )
)]
pub(crate) async fn create_group(
    _session: AdminSession,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewGroupSchema>,
) -> ServerResult<Json<Group>> {
    let group = context
        .festival
        .lineup
        .create_group(NewGroup {
            name: body.name,
            year: body.year,
            artist_ids: body.artist_ids,
            status: body.status.map(Into::into),
        })
        .await?;

    Ok(Json(group.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/groups/{id}",
    tag = "groups",
    request_body = UpdateGroupSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn update_group(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(group_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateGroupSchema>,
) -> ServerResult<Json<ActionResult>> {
    let updated = context
        .festival
        .lineup
        .update_group(UpdatedGroup {
            id: group_id,
            name: body.name,
            artist_ids: body.artist_ids,
            status: body.status.map(Into::into),
        })
        .await;

    let result = match updated {
        Ok(_) => ActionResult::ok(),
        Err(e) if e.is_not_found() => ActionResult::error("Group not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/v1/groups/{id}",
    tag = "groups",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn delete_group(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(group_id): Path<i32>,
) -> ServerResult<Json<ActionResult>> {
    let result = match context.festival.lineup.delete_group(group_id).await {
        Ok(()) => ActionResult::ok(),
        Err(e) if e.is_not_found() => ActionResult::error("Group not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(groups_by_year).post(create_group))
        .route("/:id", put(update_group).delete(delete_group))
}
