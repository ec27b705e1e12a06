use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tokio::task::spawn_blocking;
use tracing::error;

lazy_static! {
    /// Verified against when the account does not exist, so a miss costs one
    /// argon2 run like a real check does.
    static ref DECOY_HASH: Option<String> = encode("codelearn-decoy-password").ok();
}

fn encode(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            anyhow!("argon2 hash failed: {e}")
        })
}

fn check(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow!("malformed password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Argon2id with default cost, as a PHC string. Runs on the blocking pool.
pub async fn hash_password(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_owned();
    spawn_blocking(move || encode(&plain)).await?
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a valid PHC string.
pub async fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let (plain, hash) = (plain.to_owned(), hash.to_owned());
    spawn_blocking(move || check(&plain, &hash)).await?
}

/// Burns one verification for a login whose username matched nobody.
pub async fn verify_decoy(plain: &str) {
    let plain = plain.to_owned();
    let _ = spawn_blocking(move || match DECOY_HASH.as_deref() {
        Some(hash) => check(&plain, hash).map(|_| ()),
        None => encode(&plain).map(|_| ()),
    })
    .await;
}
