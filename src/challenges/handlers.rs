use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    auth::extractors::AuthUser,
    challenges::{
        dto::{ChallengeList, ChallengeQuery},
        repo_types::Challenge,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn challenge_routes() -> Router<AppState> {
    Router::new()
        .route("/challenges", get(list_challenges))
        .route("/challenges/:id", get(get_challenge))
}

/// Parses the `:id` segment shared by challenge routes.
pub(crate) fn challenge_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::Validation("Invalid challenge ID".into()))
}

#[instrument(skip(state, query))]
pub async fn list_challenges(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    query: Result<Query<ChallengeQuery>, QueryRejection>,
) -> AppResult<Json<ChallengeList>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let challenges = state
        .challenges
        .list(&filter)
        .await
        .map_err(|e| AppError::internal("Failed to fetch challenges", e))?;
    debug!(count = challenges.len(), "challenges listed");
    Ok(Json(ChallengeList {
        total: challenges.len(),
        challenges,
    }))
}

#[instrument(skip(state, id))]
pub async fn get_challenge(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Challenge>> {
    let id = challenge_id(id)?;
    state
        .challenges
        .find_by_id(id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch challenge", e))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Challenge not found".into()))
}
