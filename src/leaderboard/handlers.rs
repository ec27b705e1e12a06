use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    leaderboard::dto::{Leaderboard, LeaderboardEntry, LeaderboardQuery},
    pagination::Pagination,
    state::AppState,
};

pub fn leaderboard_routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(get_leaderboard))
}

#[instrument(skip(state, query))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> AppResult<Json<Leaderboard>> {
    let Query(query) = query?;
    let page = Pagination {
        limit: query.limit,
        offset: 0,
    }
    .validate()?;
    let entries: Vec<LeaderboardEntry> = state
        .submissions
        .leaderboard(page.limit)
        .await
        .map_err(|e| AppError::internal("Failed to fetch leaderboard", e))?
        .into_iter()
        .map(LeaderboardEntry::from)
        .collect();
    Ok(Json(Leaderboard {
        total: entries.len(),
        leaderboard: entries,
    }))
}
