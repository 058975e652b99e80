//! Authentication handlers.

use actix_web::{HttpRequest, HttpResponse, web};

use quill_core::domain::Session;
use quill_core::ports::AuthError;
use quill_shared::dto::{LoginRequest, RegisterRequest, SessionResponse, UserResponse};
use quill_shared::{ApiResponse, MessageKey};

use super::login_view::{DEFAULT_REDIRECT, safe_redirect};
use crate::middleware::auth::{Lang, expired_session_cookie, session_cookie, session_token};
use crate::middleware::error::{AppError, AppResult, Localize};
use crate::state::AppState;

fn session_response(session: &Session, redirect: String) -> SessionResponse {
    SessionResponse {
        access_token: session.access_token.clone(),
        token_type: "Bearer".to_string(),
        expires_at: session.expires_at,
        user: UserResponse {
            id: session.user_id,
            email: session.email.clone(),
        },
        redirect,
    }
}

fn required_token(req: &HttpRequest, lang: Lang) -> AppResult<String> {
    session_token(req).ok_or_else(|| AppError::session_required().localized(lang.0))
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    Lang(locale): Lang,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .login
        .sign_up(&req.email, &req.password)
        .await
        .localized(locale)?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        UserResponse {
            id: user.id,
            email: user.email,
        },
        MessageKey::Registered.text(locale),
    )))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    Lang(locale): Lang,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state
        .login
        .sign_in(&req.email, &req.password)
        .await
        .localized(locale)?;

    let redirect = safe_redirect(req.redirect.as_deref());
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session))
        .json(session_response(&session, redirect)))
}

/// POST /api/auth/logout
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    Lang(locale): Lang,
) -> AppResult<HttpResponse> {
    if let Some(token) = session_token(&req) {
        state.login.sign_out(&token).await.localized(locale)?;
    }

    let mut cookie = expired_session_cookie();
    cookie.make_removal();
    Ok(HttpResponse::NoContent().cookie(cookie).finish())
}

/// GET /api/auth/session
pub async fn session(
    req: HttpRequest,
    state: web::Data<AppState>,
    lang: Lang,
) -> AppResult<HttpResponse> {
    let token = required_token(&req, lang)?;
    let user = state
        .auth
        .get_user(&token)
        .await
        .localized(lang.0)?
        .ok_or_else(|| AppError::session_required().localized(lang.0))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserResponse {
        id: user.id,
        email: user.email,
    })))
}

/// POST /api/auth/refresh
///
/// Only the administrator keeps a refreshed session; any other account is
/// signed out on the spot.
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    lang: Lang,
) -> AppResult<HttpResponse> {
    let token = required_token(&req, lang)?;
    let session = state.auth.refresh_session(&token).await.localized(lang.0)?;

    if !state.gate.is_admin(&session.email) {
        if let Err(e) = state.auth.sign_out(&session.access_token).await {
            tracing::warn!(error = %e, "Failed to sign out refreshed session");
        }
        return Err(AppError::from(AuthError::NotAdministrator).localized(lang.0));
    }

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session))
        .json(session_response(&session, DEFAULT_REDIRECT.to_string())))
}
