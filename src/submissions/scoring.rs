//! Mock grading. Code is never executed: a challenge whose test cases parse
//! counts every case as passed.

use std::collections::HashMap;

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub score: i32,
    pub output: String,
}

pub fn evaluate(test_cases: &str) -> Verdict {
    match serde_json::from_str::<Vec<HashMap<String, String>>>(test_cases) {
        Ok(cases) => {
            debug!(cases = cases.len(), "all test cases marked as passed");
            Verdict {
                status: Status::Passed,
                score: 100,
                output: "All tests passed! Great job!".into(),
            }
        }
        Err(e) => {
            warn!(error = %e, "challenge has malformed test cases");
            Verdict {
                status: Status::Failed,
                score: 0,
                output: "Error: Invalid test cases format".into(),
            }
        }
    }
}
