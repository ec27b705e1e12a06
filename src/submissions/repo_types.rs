use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub challenge_id: i64,
    pub code: String,
    pub language: String,
    pub status: String, // passed | failed
    pub score: i32,
    pub output: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Row of the caller's history, joined with the challenge title.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubmissionListItem {
    pub id: i64,
    pub user_id: i64,
    pub challenge_id: i64,
    pub challenge_title: String,
    pub code: String,
    pub language: String,
    pub status: String,
    pub score: i32,
    pub output: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: i64,
    pub challenge_id: i64,
    pub code: String,
    pub language: String,
    pub status: String,
    pub score: i32,
    pub output: String,
}

/// Per-user aggregate feeding the leaderboard.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub username: String,
    pub total_score: i64,
    pub submissions: i64,
    pub last_activity: OffsetDateTime,
}
