use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, UtcOffset};

use crate::pagination::default_limit;
use crate::submissions::repo_types::LeaderboardRow;

const ACTIVITY_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub total_score: i64,
    pub submissions: i64,
    pub last_activity: String, // UTC, "YYYY-MM-DD HH:MM:SS"
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(r: LeaderboardRow) -> Self {
        let last_activity = r
            .last_activity
            .to_offset(UtcOffset::UTC)
            .format(ACTIVITY_FORMAT)
            .unwrap_or_default();
        Self {
            username: r.username,
            total_score: r.total_score,
            submissions: r.submissions,
            last_activity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub total: usize,
}
