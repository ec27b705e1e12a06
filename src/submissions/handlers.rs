use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    challenges::handlers::challenge_id,
    error::{AppError, AppResult},
    pagination::Pagination,
    state::AppState,
    submissions::{
        dto::{SubmissionList, SubmitSolutionRequest, SubmitSolutionResponse},
        repo_types::Submission,
        services,
    },
};

pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/challenges/:id/submit", post(submit_solution))
        .route("/submissions", get(list_submissions))
        .route("/submissions/:id", get(get_submission))
}

#[instrument(skip(state, id, payload))]
pub async fn submit_solution(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SubmitSolutionRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SubmitSolutionResponse>)> {
    let challenge_id = challenge_id(id)?;
    let Json(payload) = payload?;
    let payload = payload.normalize_and_validate()?;

    let submission = services::submit_solution(
        state.challenges.as_ref(),
        state.submissions.as_ref(),
        identity.user_id,
        challenge_id,
        payload,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitSolutionResponse {
            message: "Solution submitted successfully".into(),
            submission,
        }),
    ))
}

#[instrument(skip(state, page))]
pub async fn list_submissions(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    page: Result<Query<Pagination>, QueryRejection>,
) -> AppResult<Json<SubmissionList>> {
    let Query(page) = page?;
    let page = page.validate()?;
    let submissions = state
        .submissions
        .list_by_user(identity.user_id, page.limit, page.offset)
        .await
        .map_err(|e| AppError::internal("Failed to fetch submissions", e))?;
    Ok(Json(SubmissionList {
        total: submissions.len(),
        submissions,
    }))
}

#[instrument(skip(state, id))]
pub async fn get_submission(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Submission>> {
    let Path(id) = id.map_err(|_| AppError::Validation("Invalid submission ID".into()))?;
    state
        .submissions
        .find_for_user(id, identity.user_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch submission", e))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))
}
