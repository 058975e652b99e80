//! Session extraction and the admin identity extractor.

use std::fmt;
use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite, time::OffsetDateTime};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use quill_core::domain::Session;
use quill_core::services::{Access, login_redirect};
use quill_shared::Locale;

use crate::state::AppState;

/// Cookie carrying the access token for browser sessions.
pub const SESSION_COOKIE: &str = "quill-session";

/// Access token from the session cookie or an `Authorization: Bearer` header.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// The session cookie for a freshly issued session.
pub fn session_cookie(session: &Session) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, session.access_token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp()) {
        cookie.set_expires(expires);
    }
    cookie
}

/// A cookie value that clears the session cookie when sent as a removal.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "").path("/").finish()
}

/// The administrator behind an admin request.
///
/// Applies the session gate policy on its own, so an admin handler never
/// runs for any other account even when mounted outside the gated prefix.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub user_id: Uuid,
    pub email: String,
}

/// Redirect issued when the admin extractor refuses a request.
#[derive(Debug)]
pub struct GateRejection {
    location: String,
    clear_session: bool,
}

impl GateRejection {
    pub fn from_access(access: Access, path: &str) -> Self {
        match access {
            Access::Unauthorized { location, .. } => Self {
                location,
                clear_session: true,
            },
            Access::LoginRequired { location } => Self {
                location,
                clear_session: false,
            },
            Access::Public | Access::Granted(_) => Self {
                location: login_redirect(path),
                clear_session: false,
            },
        }
    }

    pub fn response(&self) -> HttpResponse {
        let mut response = HttpResponse::Found()
            .insert_header((header::LOCATION, self.location.as_str()))
            .finish();
        if self.clear_session {
            if let Err(e) = response.add_removal_cookie(&expired_session_cookie()) {
                tracing::warn!(error = %e, "Failed to clear session cookie");
            }
        }
        response
    }
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to {}", self.location)
    }
}

impl ResponseError for GateRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        self.response()
    }
}

impl FromRequest for AdminIdentity {
    type Error = GateRejection;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let path = req.path().to_string();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        // The gate middleware leaves the resolved session behind.
        let resolved = req.extensions().get::<Session>().cloned();
        let token = session_token(req);

        Box::pin(async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(GateRejection::from_access(Access::Public, &path));
            };

            // Evaluate the policy for the gated prefix even if this handler
            // is mounted elsewhere.
            let policy_path = if state.gate.guards(&path) {
                path.clone()
            } else {
                quill_core::services::session_gate::ADMIN_PREFIX.to_string()
            };

            let access = match resolved {
                Some(session) => state.gate.authorize(&policy_path, Some(session)),
                None => {
                    state
                        .gate
                        .enforce(state.auth.as_ref(), &policy_path, token.as_deref())
                        .await
                }
            };

            match access {
                Access::Granted(session) => Ok(AdminIdentity {
                    user_id: session.user_id,
                    email: session.email,
                }),
                other => Err(GateRejection::from_access(other, &path)),
            }
        })
    }
}

/// Display language chosen from `Accept-Language`.
#[derive(Debug, Clone, Copy)]
pub struct Lang(pub Locale);

impl FromRequest for Lang {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let locale = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Locale::from_accept_language)
            .unwrap_or_default();
        ready(Ok(Lang(locale)))
    }
}
