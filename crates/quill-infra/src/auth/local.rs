//! Self-hosted auth backend: accounts in a [`UserRepository`], Argon2
//! password hashes, JWT access tokens and a server-side session table so
//! sessions can be revoked.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use quill_core::domain::{AuthEvent, AuthUser, Session, User, mask_email, normalize_email};
use quill_core::ports::{
    Attempt, AttemptLimiter, AuthBackend, AuthError, PasswordService, TokenService,
    UserRepository,
};
use quill_core::{StoreError, StoreErrorCode};

const EVENT_CAPACITY: usize = 64;

pub struct LocalAuthBackend {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    limiter: Arc<dyn AttemptLimiter>,
    sessions: RwLock<HashMap<Uuid, Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl LocalAuthBackend {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        limiter: Arc<dyn AttemptLimiter>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            users,
            passwords,
            tokens,
            limiter,
            sessions: RwLock::new(HashMap::new()),
            events,
        }
    }

    async fn throttle(&self, key: &str) -> Result<(), AuthError> {
        match self.limiter.check(key).await {
            Ok(Attempt::Allowed) => Ok(()),
            Ok(Attempt::Throttled { retry_after }) => Err(AuthError::RateLimited { retry_after }),
            Err(e) => {
                // A broken limiter must not lock the administrator out.
                tracing::warn!(error = %e, "Attempt limiter unavailable");
                Ok(())
            }
        }
    }

    fn publish(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("No auth event subscribers");
        }
    }

    /// Record a live session, dropping any that have expired.
    async fn store_session(&self, session: &Session) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.id, session.clone());
    }

    /// The live session a token belongs to, if any.
    async fn resolve(&self, access_token: &str) -> Option<Session> {
        let claims = match self.tokens.validate(access_token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected access token");
                return None;
            }
        };
        let sessions = self.sessions.read().await;
        sessions
            .get(&claims.session_id)
            .filter(|s| s.access_token == access_token && s.expires_at > Utc::now())
            .cloned()
    }
}

fn backend_error(err: StoreError) -> AuthError {
    AuthError::Backend(err.to_string())
}

#[async_trait]
impl AuthBackend for LocalAuthBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        self.throttle(&format!("sign-in:{email}")).await?;

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(backend_error)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::info!(email = %mask_email(&email), "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let session_id = Uuid::new_v4();
        let issued = self.tokens.issue(session_id, user.id, &user.email)?;
        let session = Session {
            id: session_id,
            user_id: user.id,
            email: user.email,
            access_token: issued.token,
            expires_at: issued.expires_at,
        };

        self.store_session(&session).await;
        tracing::info!(session_id = %session.id, user_id = %session.user_id, "Session opened");
        self.publish(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email);
        self.throttle(&format!("sign-up:{email}")).await?;

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(backend_error)?
            .is_some()
        {
            return Err(AuthError::AlreadyRegistered);
        }

        let hash = self.passwords.hash(password)?;
        let user = self
            .users
            .insert(User::new(&email, hash))
            .await
            .map_err(|e| match e.code() {
                Some(StoreErrorCode::UniqueViolation) => AuthError::AlreadyRegistered,
                _ => backend_error(e),
            })?;

        tracing::info!(user_id = %user.id, email = %mask_email(&user.email), "Account registered");
        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let Ok(claims) = self.tokens.validate(access_token) else {
            return Ok(());
        };
        let removed = self.sessions.write().await.remove(&claims.session_id);
        if let Some(session) = removed {
            tracing::info!(session_id = %session.id, "Session closed");
            self.publish(AuthEvent::SignedOut {
                session_id: session.id,
                user_id: session.user_id,
            });
        }
        Ok(())
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        Ok(self.resolve(access_token).await)
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.resolve(access_token).await.map(|s| s.user()))
    }

    async fn refresh_session(&self, access_token: &str) -> Result<Session, AuthError> {
        let current = self
            .resolve(access_token)
            .await
            .ok_or(AuthError::SessionExpired)?;

        let issued = self
            .tokens
            .issue(current.id, current.user_id, &current.email)?;
        let session = Session {
            access_token: issued.token,
            expires_at: issued.expires_at,
            ..current
        };

        self.store_session(&session).await;
        self.publish(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use crate::memory::InMemoryUserRepository;
    use crate::rate_limit::{InMemoryRateLimiter, RateLimitConfig};
    use std::time::Duration;

    fn backend(max_attempts: u32) -> LocalAuthBackend {
        LocalAuthBackend::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(JwtConfig {
                secret: "test-secret".to_string(),
                expiration_hours: 1,
                issuer: "quill-test".to_string(),
            })),
            Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
                max_requests: max_attempts,
                window: Duration::from_secs(60),
            })),
        )
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = backend(10);
        let user = auth.sign_up("Admin@Example.com", "secret1").await.unwrap();
        assert_eq!(user.email, "admin@example.com");

        let session = auth.sign_in("admin@example.com", "secret1").await.unwrap();
        assert_eq!(session.user_id, user.id);

        let resolved = auth.get_session(&session.access_token).await.unwrap();
        assert_eq!(resolved, Some(session));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let auth = backend(10);
        auth.sign_up("a@example.com", "secret1").await.unwrap();
        assert!(matches!(
            auth.sign_up("A@example.com", "secret1").await,
            Err(AuthError::AlreadyRegistered)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_account() {
        let auth = backend(10);
        auth.sign_up("a@example.com", "secret1").await.unwrap();

        assert!(matches!(
            auth.sign_in("a@example.com", "secret2").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("b@example.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_is_rate_limited() {
        let auth = backend(2);
        auth.sign_up("a@example.com", "secret1").await.unwrap();

        for _ in 0..2 {
            let _ = auth.sign_in("a@example.com", "wrong!").await;
        }
        assert!(matches!(
            auth.sign_in("a@example.com", "secret1").await,
            Err(AuthError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_expired_sessions_are_dropped_on_sign_in() {
        let auth = backend(10);
        auth.sign_up("a@example.com", "secret1").await.unwrap();

        let stale = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            access_token: "stale".to_string(),
            expires_at: Utc::now() - chrono::TimeDelta::minutes(5),
        };
        auth.sessions.write().await.insert(stale.id, stale.clone());

        let session = auth.sign_in("a@example.com", "secret1").await.unwrap();
        let sessions = auth.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&session.id));
        assert!(!sessions.contains_key(&stale.id));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_and_broadcasts() {
        let auth = backend(10);
        auth.sign_up("a@example.com", "secret1").await.unwrap();
        let mut events = auth.subscribe();
        let session = auth.sign_in("a@example.com", "secret1").await.unwrap();

        auth.sign_out(&session.access_token).await.unwrap();
        assert_eq!(auth.get_session(&session.access_token).await.unwrap(), None);

        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn(_)));
        match events.recv().await.unwrap() {
            AuthEvent::SignedOut { session_id, .. } => assert_eq!(session_id, session.id),
            other => panic!("expected SignedOut, got {other:?}"),
        }

        // Unknown and malformed tokens are not errors.
        auth.sign_out(&session.access_token).await.unwrap();
        auth.sign_out("garbage").await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_replaces_token() {
        let auth = backend(10);
        auth.sign_up("a@example.com", "secret1").await.unwrap();
        let session = auth.sign_in("a@example.com", "secret1").await.unwrap();

        // Tokens carry second-resolution timestamps.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let refreshed = auth.refresh_session(&session.access_token).await.unwrap();

        assert_eq!(refreshed.id, session.id);
        assert_ne!(refreshed.access_token, session.access_token);
        assert_eq!(auth.get_session(&session.access_token).await.unwrap(), None);
        assert!(auth.get_user(&refreshed.access_token).await.unwrap().is_some());

        assert!(matches!(
            auth.refresh_session("garbage").await,
            Err(AuthError::SessionExpired)
        ));
    }
}
