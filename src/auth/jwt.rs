use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::{Claims, TokenKind};
use crate::config::JwtConfig;
use crate::state::AppState;

/// Fixed lifetime of tokens handed to non-interactive clients.
pub const CLI_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Holds JWT signing and verification keys with lifetime policy.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// A freshly signed token and the `exp` it carries.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: i64,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::new(
            cfg.secret.as_bytes(),
            Duration::from_secs((cfg.ttl_minutes as u64) * 60),
            Duration::from_secs((cfg.refresh_ttl_minutes as u64) * 60),
        )
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
            TokenKind::Cli => CLI_TOKEN_TTL,
        }
    }

    /// Signs claims for `now`. Output depends only on inputs and the key.
    pub fn sign_at(
        &self,
        user_id: i64,
        username: &str,
        kind: TokenKind,
        now: OffsetDateTime,
    ) -> anyhow::Result<SignedToken> {
        let exp = now + TimeDuration::seconds(self.ttl(kind).as_secs() as i64);
        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        debug!(user_id, kind = ?kind, "jwt signed");
        Ok(SignedToken {
            token,
            expires_at: exp.unix_timestamp(),
        })
    }

    fn sign(&self, user_id: i64, username: &str, kind: TokenKind) -> anyhow::Result<SignedToken> {
        self.sign_at(user_id, username, kind, OffsetDateTime::now_utc())
    }

    pub fn sign_access(&self, user_id: i64, username: &str) -> anyhow::Result<SignedToken> {
        self.sign(user_id, username, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user_id: i64, username: &str) -> anyhow::Result<SignedToken> {
        self.sign(user_id, username, TokenKind::Refresh)
    }

    pub fn sign_cli(&self, user_id: i64, username: &str) -> anyhow::Result<SignedToken> {
        self.sign(user_id, username, TokenKind::Cli)
    }

    /// Matches the token's lifetime against the configured policies.
    /// Access wins a tie, so equal TTLs never lock a session out.
    pub fn kind_of(&self, claims: &Claims) -> Option<TokenKind> {
        let lifetime = claims.exp.checked_sub(claims.iat)? as u64;
        [TokenKind::Access, TokenKind::Cli, TokenKind::Refresh]
            .into_iter()
            .find(|kind| self.ttl(*kind).as_secs() == lifetime)
    }

    /// Checks algorithm, signature and expiry (no leeway).
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }
}
