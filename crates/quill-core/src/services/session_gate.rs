//! Session gate: the single admin authorization policy.
//!
//! Used by the routing middleware, by the admin identity extractor and by
//! the auth-state watcher. The administrator check is a plain email
//! equality test.

use tokio::sync::broadcast;
use url::form_urlencoded;

use crate::domain::{AuthEvent, Session, mask_email, normalize_email};
use crate::ports::AuthBackend;

/// Path prefix guarded by default.
pub const ADMIN_PREFIX: &str = "/admin";

/// Where a rejected non-admin session is sent.
pub const UNAUTHORIZED_LOCATION: &str = "/login?error=unauthorized";

const LOGIN_PATH: &str = "/login";

/// Decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Path is outside the guarded prefix.
    Public,
    Granted(Session),
    /// No usable session. Redirect to the login page.
    LoginRequired { location: String },
    /// Signed in, but not the administrator. The session must be terminated.
    Unauthorized { location: String, session: Session },
}

#[derive(Debug, Clone)]
pub struct SessionGate {
    admin_email: String,
    prefix: String,
}

impl SessionGate {
    pub fn new(admin_email: &str) -> Self {
        Self::with_prefix(admin_email, ADMIN_PREFIX)
    }

    pub fn with_prefix(admin_email: &str, prefix: &str) -> Self {
        Self {
            admin_email: normalize_email(admin_email),
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// `true` for the prefix itself and anything below it.
    pub fn guards(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        !self.admin_email.is_empty() && normalize_email(email) == self.admin_email
    }

    /// Apply the policy to an already resolved session.
    pub fn authorize(&self, path: &str, session: Option<Session>) -> Access {
        if !self.guards(path) {
            return Access::Public;
        }
        match session {
            None => Access::LoginRequired {
                location: login_redirect(path),
            },
            Some(session) if self.is_admin(&session.email) => Access::Granted(session),
            Some(session) => Access::Unauthorized {
                location: UNAUTHORIZED_LOCATION.to_string(),
                session,
            },
        }
    }

    /// Resolve `token` against the auth backend, apply the policy and
    /// terminate the session of a non-admin account.
    pub async fn enforce(
        &self,
        auth: &dyn AuthBackend,
        path: &str,
        token: Option<&str>,
    ) -> Access {
        if !self.guards(path) {
            return Access::Public;
        }

        let session = match token {
            Some(token) if !token.is_empty() => match auth.get_session(token).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(error = %e, path, "Session lookup failed");
                    None
                }
            },
            _ => None,
        };

        let access = self.authorize(path, session);
        if let Access::Unauthorized { session, .. } = &access {
            tracing::warn!(
                email = %mask_email(&session.email),
                path,
                "Non-administrator session rejected"
            );
            self.terminate(auth, session).await;
        }
        access
    }

    /// Re-apply the policy to every sign-in and token refresh until the
    /// channel closes.
    pub async fn watch(&self, auth: &dyn AuthBackend, mut events: broadcast::Receiver<AuthEvent>) {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedIn(session)) | Ok(AuthEvent::TokenRefreshed(session)) => {
                    if !self.is_admin(&session.email) {
                        tracing::warn!(
                            email = %mask_email(&session.email),
                            "Signing out non-administrator session"
                        );
                        self.terminate(auth, &session).await;
                    }
                }
                Ok(AuthEvent::SignedOut { session_id, .. }) => {
                    tracing::debug!(session_id = %session_id, "Session signed out");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth event watcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("Auth event watcher stopped");
    }

    async fn terminate(&self, auth: &dyn AuthBackend, session: &Session) {
        if let Err(e) = auth.sign_out(&session.access_token).await {
            tracing::error!(error = %e, session_id = %session.id, "Failed to sign out session");
        }
    }
}

/// `/login?redirect=<path>` with the path percent-encoded.
pub fn login_redirect(path: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", path)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}
