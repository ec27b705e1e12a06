use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Challenge with its test cases, as returned by `GET /challenges/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Challenge {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub language: String,
    pub test_cases: String, // JSON array of {input, expected}
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// List view; test cases are withheld.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChallengeSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub language: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Challenge> for ChallengeSummary {
    fn from(c: Challenge) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            difficulty: c.difficulty,
            language: c.language,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChallengeFilter {
    pub difficulty: Option<String>,
    pub language: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
