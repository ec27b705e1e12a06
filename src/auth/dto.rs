use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::repo_types::User;
use crate::error::AppError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid email".into()))
    }
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Trims and lower-cases, then checks shape.
    pub fn normalize_and_validate(mut self) -> Result<Self, AppError> {
        self.username = self.username.trim().to_string();
        self.email = normalize_email(&self.email);

        let len = self.username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
            return Err(AppError::Validation(format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN, USERNAME_MAX
            )));
        }
        check_email(&self.email)?;
        if self.password.chars().count() < PASSWORD_MIN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN
            )));
        }
        Ok(self)
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn normalize_and_validate(mut self) -> Result<Self, AppError> {
        self.username = self.username.trim().to_string();
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".into(),
            ));
        }
        Ok(self)
    }
}

/// Request body for `PUT /profile`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: String,
}

impl UpdateProfileRequest {
    pub fn normalize_and_validate(mut self) -> Result<Self, AppError> {
        self.email = normalize_email(&self.email);
        check_email(&self.email)?;
        Ok(self)
    }
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct CliAuthResponse {
    pub cli_token: String,
    pub user_id: i64,
    pub username: String,
    pub expires_at: i64, // unix seconds
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
