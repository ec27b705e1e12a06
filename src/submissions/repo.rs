use async_trait::async_trait;

use crate::db::{PgStore, RepoResult};
use crate::submissions::repo_types::{
    LeaderboardRow, NewSubmission, Submission, SubmissionListItem,
};

#[async_trait]
pub trait SubmissionRepo: Send + Sync {
    async fn insert(&self, new: NewSubmission) -> RepoResult<Submission>;
    /// Newest first.
    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<SubmissionListItem>>;
    /// Only returns the row when it belongs to `user_id`.
    async fn find_for_user(&self, id: i64, user_id: i64) -> RepoResult<Option<Submission>>;
    /// Every user, including those without submissions.
    async fn leaderboard(&self, limit: i64) -> RepoResult<Vec<LeaderboardRow>>;
}

const SUBMISSION_COLUMNS: &str =
    "id, user_id, challenge_id, code, language, status, score, output, created_at";

#[async_trait]
impl SubmissionRepo for PgStore {
    async fn insert(&self, new: NewSubmission) -> RepoResult<Submission> {
        let row = sqlx::query_as::<_, Submission>(&format!(
            r#"
            INSERT INTO submissions (user_id, challenge_id, code, language, status, score, output)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(new.challenge_id)
        .bind(&new.code)
        .bind(&new.language)
        .bind(&new.status)
        .bind(new.score)
        .bind(&new.output)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<SubmissionListItem>> {
        let rows = sqlx::query_as::<_, SubmissionListItem>(
            r#"
            SELECT s.id, s.user_id, s.challenge_id, c.title AS challenge_title,
                   s.code, s.language, s.status, s.score, s.output, s.created_at
            FROM submissions s
            JOIN challenges c ON s.challenge_id = c.id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_for_user(&self, id: i64, user_id: i64) -> RepoResult<Option<Submission>> {
        let row = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn leaderboard(&self, limit: i64) -> RepoResult<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT u.username,
                   COALESCE(SUM(s.score), 0)::BIGINT AS total_score,
                   COUNT(s.id) AS submissions,
                   COALESCE(MAX(s.created_at), u.created_at) AS last_activity
            FROM users u
            LEFT JOIN submissions s ON u.id = s.user_id
            GROUP BY u.id, u.username, u.created_at
            ORDER BY total_score DESC, submissions DESC, u.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
