use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json,
};
use rooranking_core::RankingError;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{SetRankingSchema, ValidatedJson, YearQuery},
    serialized::{ActionResult, ArtistAggregate, ToSerialized},
    Router,
};

#[utoipa::path(
    put,
    path = "/v1/rankings/{artistId}",
    tag = "rankings",
    request_body = SetRankingSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn set_ranking(
    session: Session,
    State(context): State<ServerContext>,
    Path(artist_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<SetRankingSchema>,
) -> ServerResult<Json<ActionResult>> {
    let set = context
        .festival
        .rankings
        .set_ranking(session.user().id, artist_id, body.score)
        .await;

    let result = match set {
        Ok(_) => ActionResult::ok(),
        Err(e @ RankingError::ScoreOutOfRange) => ActionResult::error(e.to_string()),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/v1/rankings/{artistId}",
    tag = "rankings",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActionResult)
    )
)]
pub(crate) async fn clear_ranking(
    session: Session,
    State(context): State<ServerContext>,
    Path(artist_id): Path<i32>,
) -> ServerResult<Json<ActionResult>> {
    context
        .festival
        .rankings
        .clear_ranking(session.user().id, artist_id)
        .await?;

    Ok(Json(ActionResult::ok()))
}

#[utoipa::path(
    get,
    path = "/v1/rankings/user/{userId}",
    tag = "rankings",
    params(YearQuery),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "The user's scores for the year, as an artist id to score map")
    )
)]
pub(crate) async fn user_rankings(
    _session: Session,
    State(context): State<ServerContext>,
    Path(user_id): Path<i32>,
    Query(query): Query<YearQuery>,
) -> ServerResult<Json<HashMap<i32, i32>>> {
    let rankings = context
        .festival
        .rankings
        .user_rankings_for_year(user_id, query.year)
        .await?;

    Ok(Json(rankings))
}

#[utoipa::path(
    get,
    path = "/v1/rankings/aggregate",
    tag = "rankings",
    params(YearQuery),
    responses(
        (status = 200, body = Vec<ArtistAggregate>)
    )
)]
pub(crate) async fn aggregate_rankings(
    State(context): State<ServerContext>,
    Query(query): Query<YearQuery>,
) -> ServerResult<Json<Vec<ArtistAggregate>>> {
    let aggregates = context
        .festival
        .rankings
        .aggregate_rankings(query.year)
        .await?;

    Ok(Json(aggregates.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/aggregate", get(aggregate_rankings))
        .route("/user/:user_id", get(user_rankings))
        .route("/:artist_id", put(set_ranking).delete(clear_ranking))
}
