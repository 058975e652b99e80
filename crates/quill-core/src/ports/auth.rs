//! Authentication ports.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{AuthEvent, AuthUser, Session};

/// The auth service: session issuance and refresh, sign-in/up/out and
/// auth-state change notifications.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Terminate the session behind `access_token`. Unknown sessions are not an error.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Resolve a token to a live session. Expired, revoked or malformed
    /// tokens resolve to `None`.
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError>;

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Issue a fresh token for a live session.
    async fn refresh_session(&self, access_token: &str) -> Result<Session, AuthError>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Claims carried by an access token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub exp: i64,
}

/// A signed access token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access token signing.
pub trait TokenService: Send + Sync {
    fn issue(&self, session_id: Uuid, user_id: Uuid, email: &str)
    -> Result<IssuedToken, AuthError>;

    fn validate(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;

    fn check_strength(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }
        Ok(())
    }
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    AlreadyRegistered,

    #[error("Account is not the administrator")]
    NotAdministrator,

    #[error("Too many attempts, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing session")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Auth backend error: {0}")]
    Backend(String),
}
