use tracing::{info, warn};

use crate::auth::{
    claims::Identity,
    dto::{AuthResponse, CliAuthResponse, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_decoy, verify_password},
    repo::UserRepo,
    repo_types::{NewUser, User},
};
use crate::db::RepoError;
use crate::error::{AppError, AppResult};

const DUPLICATE_USER: &str = "Username or email already exists";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn issue_pair(keys: &JwtKeys, user: User) -> AppResult<AuthResponse> {
    let access = keys
        .sign_access(user.id, &user.username)
        .map_err(|e| AppError::internal("Failed to generate tokens", e))?;
    let refresh = keys
        .sign_refresh(user.id, &user.username)
        .map_err(|e| AppError::internal("Failed to generate tokens", e))?;
    Ok(AuthResponse {
        token: access.token,
        refresh_token: refresh.token,
        user,
    })
}

/// Expects a request that already passed `normalize_and_validate`.
pub async fn register(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> AppResult<AuthResponse> {
    let existing = users
        .find_by_username_or_email(&req.username, &req.email)
        .await
        .map_err(|e| AppError::internal("Database error", e))?;
    if existing.is_some() {
        warn!(username = %req.username, "username or email already registered");
        return Err(AppError::Conflict(DUPLICATE_USER.into()));
    }

    let password_hash = hash_password(&req.password)
        .await
        .map_err(|e| AppError::internal("Failed to hash password", e))?;

    // The unique constraints still catch a concurrent registration that slipped past the check.
    let user = users
        .insert(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            RepoError::UniqueViolation => AppError::Conflict(DUPLICATE_USER.into()),
            other => AppError::internal("Failed to create user", other),
        })?;

    info!(user_id = user.id, username = %user.username, "user registered");
    issue_pair(keys, user)
}

pub async fn login(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    req: LoginRequest,
) -> AppResult<AuthResponse> {
    let user = match users.find_by_username(&req.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            verify_decoy(&req.password).await;
            warn!(username = %req.username, "login unknown username");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        Err(e) => return Err(AppError::internal("Database error", e)),
    };

    let ok = verify_password(&req.password, &user.password_hash)
        .await
        .map_err(|e| AppError::internal("Failed to verify credentials", e))?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    info!(user_id = user.id, username = %user.username, "user logged in");
    issue_pair(keys, user)
}

/// The id comes from a validated token, so a miss means the store is inconsistent.
pub async fn get_profile(users: &dyn UserRepo, user_id: i64) -> AppResult<User> {
    match users.find_by_id(user_id).await {
        Ok(Some(u)) => Ok(u),
        Ok(None) => Err(AppError::internal(
            "Failed to get user profile",
            format!("user {} from token not in store", user_id),
        )),
        Err(e) => Err(AppError::internal("Failed to get user profile", e)),
    }
}

pub async fn update_profile(users: &dyn UserRepo, user_id: i64, email: &str) -> AppResult<()> {
    let updated = users.update_email(user_id, email).await.map_err(|e| match e {
        RepoError::UniqueViolation => AppError::Conflict("Email already in use".into()),
        other => AppError::internal("Failed to update profile", other),
    })?;
    if !updated {
        return Err(AppError::internal(
            "Failed to update profile",
            format!("user {} from token not in store", user_id),
        ));
    }
    info!(user_id, "profile updated");
    Ok(())
}

pub fn issue_cli_token(keys: &JwtKeys, identity: &Identity) -> AppResult<CliAuthResponse> {
    let signed = keys
        .sign_cli(identity.user_id, &identity.username)
        .map_err(|e| AppError::internal("Failed to generate CLI token", e))?;
    info!(user_id = identity.user_id, "cli token issued");
    Ok(CliAuthResponse {
        cli_token: signed.token,
        user_id: identity.user_id,
        username: identity.username.clone(),
        expires_at: signed.expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::dto::UpdateProfileRequest;
    use crate::memory::MemoryStore;
    use axum::http::StatusCode;
    use std::time::Duration;

    fn keys() -> JwtKeys {
        JwtKeys::new(b"test-secret", Duration::from_secs(300), Duration::from_secs(3600))
    }

    fn reg(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
        .normalize_and_validate()
        .unwrap()
    }

    fn creds(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let store = MemoryStore::new();
        let keys = keys();

        let registered = register(&store, &keys, reg("alice", "alice@x.com", "secret1"))
            .await
            .expect("register");
        assert_eq!(registered.user.id, 1);
        assert!(!registered.token.is_empty());
        assert!(!registered.refresh_token.is_empty());
        assert_ne!(registered.user.password_hash, "secret1");

        let logged_in = login(&store, &keys, creds("alice", "secret1"))
            .await
            .expect("login");
        assert_eq!(logged_in.user.id, registered.user.id);
        let claims = keys.verify(&logged_in.token).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn conflict_on_either_field() {
        let store = MemoryStore::new();
        let keys = keys();
        register(&store, &keys, reg("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        let same_email = register(&store, &keys, reg("bob", "ALICE@x.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(same_email.status(), StatusCode::CONFLICT);
        assert_eq!(same_email.to_string(), DUPLICATE_USER);

        let same_name = register(&store, &keys, reg("alice", "other@x.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(same_name.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn insert_race_surfaces_as_conflict() {
        let store = MemoryStore::new();
        store.hide_users_from_lookups();
        let keys = keys();
        register(&store, &keys, reg("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let err = register(&store, &keys, reg("alice", "alice2@x.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn wrong_password_looks_like_unknown_user() {
        let store = MemoryStore::new();
        let keys = keys();
        register(&store, &keys, reg("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        let wrong = login(&store, &keys, creds("alice", "wrong")).await.unwrap_err();
        let unknown = login(&store, &keys, creds("nobody", "secret1")).await.unwrap_err();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.status(), unknown.status());
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn unknown_user_login_takes_as_long_as_wrong_password() {
        let store = MemoryStore::new();
        let keys = keys();
        register(&store, &keys, reg("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let _ = login(&store, &keys, creds("warmup", "wrong!")).await;

        let mut existing = std::time::Duration::ZERO;
        let mut unknown = std::time::Duration::ZERO;
        for _ in 0..3 {
            let start = std::time::Instant::now();
            let _ = login(&store, &keys, creds("alice", "wrong!")).await;
            existing += start.elapsed();

            let start = std::time::Instant::now();
            let _ = login(&store, &keys, creds("nobody", "wrong!")).await;
            unknown += start.elapsed();
        }
        assert!(
            unknown * 10 >= existing,
            "unknown user {:?} vs existing user {:?}",
            unknown,
            existing
        );
    }

    #[tokio::test]
    async fn profile_read_and_update() {
        let store = MemoryStore::new();
        let keys = keys();
        let alice = register(&store, &keys, reg("alice", "alice@x.com", "secret1"))
            .await
            .unwrap()
            .user;

        let req = UpdateProfileRequest {
            email: "New@X.com".into(),
        }
        .normalize_and_validate()
        .unwrap();
        update_profile(&store, alice.id, &req.email).await.unwrap();

        let profile = get_profile(&store, alice.id).await.unwrap();
        assert_eq!(profile.email, "new@x.com");
        assert!(profile.updated_at >= alice.updated_at);
    }

    #[tokio::test]
    async fn update_to_taken_email_is_conflict() {
        let store = MemoryStore::new();
        let keys = keys();
        register(&store, &keys, reg("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let bob = register(&store, &keys, reg("bob", "bob@x.com", "secret1"))
            .await
            .unwrap()
            .user;

        let err = update_profile(&store, bob.id, "alice@x.com").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_profile_is_internal() {
        let store = MemoryStore::new();
        let err = get_profile(&store, 99).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn cli_token_carries_identity() {
        let keys = keys();
        let identity = Identity {
            user_id: 5,
            username: "dave".into(),
        };
        let res = issue_cli_token(&keys, &identity).unwrap();
        let claims = keys.verify(&res.cli_token).unwrap();
        assert_eq!(claims.user_id, 5);
        assert_eq!(res.username, "dave");
        assert_eq!(claims.exp as i64, res.expires_at);
    }
}
