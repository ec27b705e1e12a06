use async_trait::async_trait;

use crate::challenges::repo_types::{Challenge, ChallengeFilter, ChallengeSummary};
use crate::db::{PgStore, RepoResult};

#[async_trait]
pub trait ChallengeRepo: Send + Sync {
    /// Newest first, exact-match filters.
    async fn list(&self, filter: &ChallengeFilter) -> RepoResult<Vec<ChallengeSummary>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Challenge>>;
}

#[async_trait]
impl ChallengeRepo for PgStore {
    async fn list(&self, filter: &ChallengeFilter) -> RepoResult<Vec<ChallengeSummary>> {
        let rows = sqlx::query_as::<_, ChallengeSummary>(
            r#"
            SELECT id, title, description, difficulty, language, created_at, updated_at
            FROM challenges
            WHERE ($1::TEXT IS NULL OR difficulty = $1)
              AND ($2::TEXT IS NULL OR language = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.difficulty.as_deref())
        .bind(filter.language.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Challenge>> {
        let row = sqlx::query_as::<_, Challenge>(
            r#"
            SELECT id, title, description, difficulty, language, test_cases, created_at, updated_at
            FROM challenges
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
