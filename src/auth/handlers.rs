use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, CliAuthResponse, LoginRequest, MessageResponse, RegisterRequest,
            UpdateProfileRequest,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        repo_types::User,
        services,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/cli/auth", post(cli_auth))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let Json(payload) = payload?;
    let payload = payload.normalize_and_validate()?;
    let keys = JwtKeys::from_ref(&state);
    let res = services::register(state.users.as_ref(), &keys, payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(payload) = payload?;
    let payload = payload.normalize_and_validate()?;
    let keys = JwtKeys::from_ref(&state);
    let res = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(res))
}

/// Refresh tokens are issued but cannot be redeemed yet.
pub async fn refresh() -> AppError {
    AppError::NotImplemented("Refresh token not implemented yet".into())
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> AppResult<Json<User>> {
    let user = services::get_profile(state.users.as_ref(), identity.user_id).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let payload = payload.normalize_and_validate()?;
    services::update_profile(state.users.as_ref(), identity.user_id, &payload.email).await?;
    Ok(Json(MessageResponse {
        message: "Profile updated successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn cli_auth(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> AppResult<Json<CliAuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(services::issue_cli_token(&keys, &identity)?))
}
