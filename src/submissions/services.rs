use tracing::info;

use crate::challenges::repo::ChallengeRepo;
use crate::error::{AppError, AppResult};
use crate::submissions::{
    dto::SubmitSolutionRequest,
    repo::SubmissionRepo,
    repo_types::{NewSubmission, Submission},
    scoring,
};

/// Scores and stores a solution for an existing challenge.
pub async fn submit_solution(
    challenges: &dyn ChallengeRepo,
    submissions: &dyn SubmissionRepo,
    user_id: i64,
    challenge_id: i64,
    req: SubmitSolutionRequest,
) -> AppResult<Submission> {
    let challenge = challenges
        .find_by_id(challenge_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch challenge", e))?
        .ok_or_else(|| AppError::NotFound("Challenge not found".into()))?;

    let verdict = scoring::evaluate(&challenge.test_cases);

    let submission = submissions
        .insert(NewSubmission {
            user_id,
            challenge_id,
            code: req.code,
            language: req.language,
            status: verdict.status.as_str().to_string(),
            score: verdict.score,
            output: verdict.output,
        })
        .await
        .map_err(|e| AppError::internal("Failed to save submission", e))?;

    info!(
        user_id,
        challenge_id,
        submission_id = submission.id,
        status = %submission.status,
        "solution submitted"
    );
    Ok(submission)
}
