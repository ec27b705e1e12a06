use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::submissions::repo_types::{Submission, SubmissionListItem};

/// Request body for `POST /challenges/:id/submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitSolutionRequest {
    pub code: String,
    pub language: String,
}

impl SubmitSolutionRequest {
    pub fn normalize_and_validate(mut self) -> Result<Self, AppError> {
        self.language = self.language.trim().to_string();
        if self.code.trim().is_empty() {
            return Err(AppError::Validation("code is required".into()));
        }
        if self.language.is_empty() {
            return Err(AppError::Validation("language is required".into()));
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitSolutionResponse {
    pub message: String,
    pub submission: Submission,
}

#[derive(Debug, Serialize)]
pub struct SubmissionList {
    pub submissions: Vec<SubmissionListItem>,
    pub total: usize,
}
