use serde::{Deserialize, Serialize};

use crate::challenges::repo_types::{ChallengeFilter, ChallengeSummary};
use crate::error::AppError;
use crate::pagination::{default_limit, Pagination};

// `limit`/`offset` are inlined: serde_urlencoded cannot parse numbers
// through `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub difficulty: Option<String>,
    pub language: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl ChallengeQuery {
    /// Blank filter values count as absent.
    pub fn into_filter(self) -> Result<ChallengeFilter, AppError> {
        let page = Pagination {
            limit: self.limit,
            offset: self.offset,
        }
        .validate()?;
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Ok(ChallengeFilter {
            difficulty: non_blank(self.difficulty),
            language: non_blank(self.language),
            limit: page.limit,
            offset: page.offset,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ChallengeList {
    pub challenges: Vec<ChallengeSummary>,
    pub total: usize,
}
