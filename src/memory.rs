//! In-memory repositories for tests. Mirrors the unique constraints and
//! orderings of the Postgres schema.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::{
    repo::UserRepo,
    repo_types::{NewUser, User},
};
use crate::challenges::{
    repo::ChallengeRepo,
    repo_types::{Challenge, ChallengeFilter, ChallengeSummary},
};
use crate::db::{RepoError, RepoResult};
use crate::submissions::{
    repo::SubmissionRepo,
    repo_types::{LeaderboardRow, NewSubmission, Submission, SubmissionListItem},
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    challenges: Vec<Challenge>,
    submissions: Vec<Submission>,
    // Makes lookups miss so inserts hit the unique check, like a concurrent registration.
    hide_users: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

const SAMPLE_CHALLENGES: [(&str, &str, &str); 5] = [
    ("Two Sum", "Easy", "python"),
    ("Reverse String", "Easy", "javascript"),
    ("Binary Search", "Medium", "go"),
    ("Valid Parentheses", "Easy", "python"),
    ("Fibonacci Sequence", "Easy", "javascript"),
];

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_challenges() -> Self {
        let store = Self::new();
        for (title, difficulty, language) in SAMPLE_CHALLENGES {
            store.add_challenge(
                title,
                difficulty,
                language,
                r#"[{"input": "0", "expected": "0"}]"#,
            );
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store poisoned")
    }

    pub fn hide_users_from_lookups(&self) {
        self.lock().hide_users = true;
    }

    /// Inserts a user with an unusable password hash; returns its id.
    pub fn add_user(&self, username: &str, email: &str) -> i64 {
        let mut inner = self.lock();
        let now = OffsetDateTime::now_utc();
        let id = inner.users.len() as i64 + 1;
        inner.users.push(User {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: "!".into(),
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_challenge(
        &self,
        title: &str,
        difficulty: &str,
        language: &str,
        test_cases: &str,
    ) -> i64 {
        let mut inner = self.lock();
        let now = OffsetDateTime::now_utc();
        let id = inner.challenges.len() as i64 + 1;
        inner.challenges.push(Challenge {
            id,
            title: title.into(),
            description: format!("{} description", title),
            difficulty: difficulty.into(),
            language: language.into(),
            test_cases: test_cases.into(),
            created_at: now,
            updated_at: now,
        });
        id
    }
}

fn page<T>(items: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    items.skip(offset as usize).take(limit as usize).collect()
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> RepoResult<Option<User>> {
        let inner = self.lock();
        if inner.hide_users {
            return Ok(None);
        }
        Ok(inner
            .users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let inner = self.lock();
        if inner.hide_users {
            return Ok(None);
        }
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new: NewUser) -> RepoResult<User> {
        let mut inner = self.lock();
        if inner
            .users
            .iter()
            .any(|u| u.username == new.username || u.email == new.email)
        {
            return Err(RepoError::UniqueViolation);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: inner.users.len() as i64 + 1,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_email(&self, id: i64, email: &str) -> RepoResult<bool> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.id != id && u.email == email) {
            return Err(RepoError::UniqueViolation);
        }
        match inner.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.email = email.to_string();
                user.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChallengeRepo for MemoryStore {
    async fn list(&self, filter: &ChallengeFilter) -> RepoResult<Vec<ChallengeSummary>> {
        let inner = self.lock();
        let mut matching: Vec<&Challenge> = inner
            .challenges
            .iter()
            .filter(|c| filter.difficulty.as_deref().map_or(true, |d| c.difficulty == d))
            .filter(|c| filter.language.as_deref().map_or(true, |l| c.language == l))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(
            matching.into_iter().cloned().map(ChallengeSummary::from),
            filter.limit,
            filter.offset,
        ))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Challenge>> {
        Ok(self.lock().challenges.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl SubmissionRepo for MemoryStore {
    async fn insert(&self, new: NewSubmission) -> RepoResult<Submission> {
        let mut inner = self.lock();
        let submission = Submission {
            id: inner.submissions.len() as i64 + 1,
            user_id: new.user_id,
            challenge_id: new.challenge_id,
            code: new.code,
            language: new.language,
            status: new.status,
            score: new.score,
            output: new.output,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<SubmissionListItem>> {
        let inner = self.lock();
        let mut own: Vec<&Submission> = inner
            .submissions
            .iter()
            .filter(|s| s.user_id == user_id)
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let items = own.into_iter().filter_map(|s| {
            let challenge = inner.challenges.iter().find(|c| c.id == s.challenge_id)?;
            Some(SubmissionListItem {
                id: s.id,
                user_id: s.user_id,
                challenge_id: s.challenge_id,
                challenge_title: challenge.title.clone(),
                code: s.code.clone(),
                language: s.language.clone(),
                status: s.status.clone(),
                score: s.score,
                output: s.output.clone(),
                created_at: s.created_at,
            })
        });
        Ok(page(items, limit, offset))
    }

    async fn find_for_user(&self, id: i64, user_id: i64) -> RepoResult<Option<Submission>> {
        Ok(self
            .lock()
            .submissions
            .iter()
            .find(|s| s.id == id && s.user_id == user_id)
            .cloned())
    }

    async fn leaderboard(&self, limit: i64) -> RepoResult<Vec<LeaderboardRow>> {
        let inner = self.lock();
        let mut rows: Vec<(i64, LeaderboardRow)> = inner
            .users
            .iter()
            .map(|u| {
                let own: Vec<&Submission> = inner
                    .submissions
                    .iter()
                    .filter(|s| s.user_id == u.id)
                    .collect();
                let row = LeaderboardRow {
                    username: u.username.clone(),
                    total_score: own.iter().map(|s| s.score as i64).sum(),
                    submissions: own.len() as i64,
                    last_activity: own
                        .iter()
                        .map(|s| s.created_at)
                        .max()
                        .unwrap_or(u.created_at),
                };
                (u.id, row)
            })
            .collect();
        rows.sort_by(|(a_id, a), (b_id, b)| {
            b.total_score
                .cmp(&a.total_score)
                .then(b.submissions.cmp(&a.submissions))
                .then(a_id.cmp(b_id))
        });
        Ok(page(rows.into_iter().map(|(_, r)| r), limit, 0))
    }
}
