//! Administrator sign-in and registration with client-side throttling.
//!
//! Every sign-in waits a fixed delay before reaching the auth backend. When
//! the backend reports rate limiting, a local cooldown starts for that key
//! and further attempts are rejected without a backend call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{AuthUser, Session, is_plausible_email, mask_email, normalize_email};
use crate::ports::{AuthBackend, AuthError, MIN_PASSWORD_LEN};

use super::session_gate::SessionGate;

/// Throttle settings for [`LoginService`].
#[derive(Debug, Clone, Copy)]
pub struct LoginConfig {
    pub delay: Duration,
    pub cooldown: Duration,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            cooldown: Duration::from_secs(30),
        }
    }
}

pub struct LoginService {
    auth: Arc<dyn AuthBackend>,
    gate: SessionGate,
    config: LoginConfig,
    cooldowns: Mutex<HashMap<String, Instant>>,
}

impl LoginService {
    pub fn new(auth: Arc<dyn AuthBackend>, gate: SessionGate, config: LoginConfig) -> Self {
        Self {
            auth,
            gate,
            config,
            cooldowns: Mutex::new(HashMap::new()),
        }
    }

    /// Sign the administrator in. Any other account is refused, before the
    /// backend call when possible and by signing out otherwise.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let key = format!("sign-in:{email}");
        self.check_cooldown(&key)?;

        if !self.gate.is_admin(&email) {
            tracing::warn!(email = %mask_email(&email), "Sign-in refused for non-administrator");
            return Err(AuthError::NotAdministrator);
        }

        tokio::time::sleep(self.config.delay).await;

        let session = match self.auth.sign_in(&email, password).await {
            Ok(session) => session,
            Err(AuthError::RateLimited { retry_after }) => {
                let retry_after = self.start_cooldown(&key).max(retry_after);
                tracing::warn!(email = %mask_email(&email), "Sign-in rate limited");
                return Err(AuthError::RateLimited { retry_after });
            }
            Err(e) => return Err(e),
        };

        if !self.gate.is_admin(&session.email) {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                tracing::error!(error = %e, "Failed to sign out non-administrator");
            }
            return Err(AuthError::NotAdministrator);
        }

        tracing::info!(email = %mask_email(&email), "Administrator signed in");
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let key = format!("sign-up:{email}");
        self.check_cooldown(&key)?;

        if !is_plausible_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }

        match self.auth.sign_up(&email, password).await {
            Err(AuthError::RateLimited { retry_after }) => {
                let retry_after = self.start_cooldown(&key).max(retry_after);
                Err(AuthError::RateLimited { retry_after })
            }
            other => other,
        }
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.auth.sign_out(access_token).await
    }

    fn check_cooldown(&self, key: &str) -> Result<(), AuthError> {
        let mut cooldowns = self.cooldowns.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        match cooldowns.get(key) {
            Some(until) if *until > now => Err(AuthError::RateLimited {
                retry_after: *until - now,
            }),
            Some(_) => {
                cooldowns.remove(key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn start_cooldown(&self, key: &str) -> Duration {
        let mut cooldowns = self.cooldowns.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        cooldowns.retain(|_, until| *until > now);
        cooldowns.insert(key.to_string(), now + self.config.cooldown);
        self.config.cooldown
    }

    #[cfg(test)]
    fn tracked_cooldowns(&self) -> usize {
        self.cooldowns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakeAuth;
    use std::sync::atomic::Ordering;

    const ADMIN: &str = "admin@example.com";

    fn service(auth: Arc<FakeAuth>) -> LoginService {
        LoginService::new(auth, SessionGate::new(ADMIN), LoginConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_waits_before_backend_call() {
        let auth = Arc::new(FakeAuth::with_accounts(&[(ADMIN, "secret1")]));
        let login = service(Arc::clone(&auth));

        let started = Instant::now();
        let session = login.sign_in(" Admin@example.com", "secret1").await.unwrap();

        assert_eq!(session.email, ADMIN);
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(auth.sign_in_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_admin_rejected_before_backend() {
        let auth = Arc::new(FakeAuth::with_accounts(&[("writer@example.com", "secret1")]));
        let login = service(Arc::clone(&auth));

        let err = login.sign_in("writer@example.com", "secret1").await.unwrap_err();

        assert!(matches!(err, AuthError::NotAdministrator));
        assert_eq!(auth.sign_in_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_credentials() {
        let login = service(Arc::new(FakeAuth::with_accounts(&[])));
        assert!(matches!(
            login.sign_in("", "secret1").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            login.sign_in(ADMIN, "").await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_rate_limit_starts_cooldown() {
        let auth = Arc::new(FakeAuth::with_accounts(&[(ADMIN, "secret1")]));
        let login = service(Arc::clone(&auth));

        auth.rate_limit_next_call();
        let err = login.sign_in(ADMIN, "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::RateLimited { .. }));
        assert_eq!(auth.sign_in_calls.load(Ordering::SeqCst), 1);

        // Rejected locally during the cooldown.
        let err = login.sign_in(ADMIN, "secret1").await.unwrap_err();
        match err {
            AuthError::RateLimited { retry_after } => {
                assert!(retry_after <= Duration::from_secs(30))
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
        assert_eq!(auth.sign_in_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(login.sign_in(ADMIN, "secret1").await.is_ok());
        assert_eq!(auth.sign_in_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cooldowns_are_dropped() {
        let auth = Arc::new(FakeAuth::with_accounts(&[]));
        let login = service(Arc::clone(&auth));

        for n in 0..3 {
            auth.rate_limit_next_call();
            let err = login
                .sign_up(&format!("user{n}@example.com"), "secret1")
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::RateLimited { .. }));
        }
        assert_eq!(login.tracked_cooldowns(), 3);

        tokio::time::advance(Duration::from_secs(31)).await;
        auth.rate_limit_next_call();
        assert!(login.sign_up("late@example.com", "secret1").await.is_err());
        assert_eq!(login.tracked_cooldowns(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_password() {
        let auth = Arc::new(FakeAuth::with_accounts(&[(ADMIN, "secret1")]));
        let login = service(auth);
        assert!(matches!(
            login.sign_in(ADMIN, "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_up_checks_input() {
        let auth = Arc::new(FakeAuth::with_accounts(&[(ADMIN, "secret1")]));
        let login = service(auth);

        assert!(matches!(
            login.sign_up("not-an-email", "secret1").await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            login.sign_up("new@example.com", "12345").await,
            Err(AuthError::WeakPassword(6))
        ));
        assert!(matches!(
            login.sign_up(ADMIN, "secret1").await,
            Err(AuthError::AlreadyRegistered)
        ));

        let user = login.sign_up("New@Example.com", "secret1").await.unwrap();
        assert_eq!(user.email, "new@example.com");
    }
}
