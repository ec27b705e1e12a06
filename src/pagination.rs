use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_LIMIT: i64 = 10;

/// `?limit=&offset=` query parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Serde default for `limit` on every list query.
pub fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Pagination {
    pub fn validate(self) -> Result<Self, AppError> {
        if self.limit < 0 || self.offset < 0 {
            return Err(AppError::Validation(
                "limit and offset must not be negative".into(),
            ));
        }
        Ok(self)
    }
}
