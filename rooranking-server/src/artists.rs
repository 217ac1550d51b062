use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json,
};
use log::info;

use crate::{
    auth::AdminSession,
    context::ServerContext,
    errors::ServerResult,
    schemas::{AddArtistsSchema, ValidatedJson, YearQuery},
    serialized::{ActionResult, AddedArtists, Artist, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/artists",
    tag = "artists",
    params(YearQuery),
    responses(
        (status = 200, body = Vec<Artist>)
    )
)]
pub(crate) async fn artists_by_year(
    State(context): State<ServerContext>,
    Query(query): Query<YearQuery>,
) -> ServerResult<Json<Vec<Artist>>> {
    let artists = context.festival.lineup.artists_by_year(query.year).await?;

    Ok(Json(artists.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/artists/years",
    tag = "artists",
    responses(
        (status = 200, body = Vec<i32>, description = "Years that have artists, most recent first")
    )
)]
pub(crate) async fn years(State(context): State<ServerContext>) -> ServerResult<Json<Vec<i32>>> {
    let years = context.festival.lineup.years_with_artists().await?;

    Ok(Json(years))
}

#[utoipa::path(
    post,
    path = "/v1/artists",
    tag = "artists",
    request_body = AddArtistsSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = AddedArtists)
    )
)]
pub(crate) async fn add_artists(
    session: AdminSession,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<AddArtistsSchema>,
) -> ServerResult<Json<AddedArtists>> {
    let result = context
        .festival
        .lineup
        .add_artists(&body.names, body.year)
        .await?;

    info!(
        "{} added {} artists to {} ({} skipped).",
        session.user().username,
        result.added.len(),
        body.year,
        result.skipped.len()
    );

    Ok(Json(result.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/artists/{id}",
    tag = "artists",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn delete_artist(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(artist_id): Path<i32>,
) -> ServerResult<Json<ActionResult>> {
    let result = match context.festival.lineup.delete_artist(artist_id).await {
        Ok(()) => ActionResult::ok(),
        Err(e) if e.is_not_found() => ActionResult::error("Artist not found"),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(artists_by_year).post(add_artists))
        .route("/years", get(years))
        .route("/:id", axum::routing::delete(delete_artist))
}
