//! Shared fixtures for handler tests.

use std::path::Path;

use actix_web::cookie::Cookie;
use actix_web::test::TestRequest;

use crate::config::AppConfig;
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

pub const ADMIN: &str = "admin@example.com";
pub const PASSWORD: &str = "secret-pass";

pub fn state(dir: &Path) -> AppState {
    AppState::in_memory(&AppConfig::for_tests(ADMIN, dir))
}

/// Register `email` and return a live access token for it.
pub async fn token_for(state: &AppState, email: &str) -> String {
    state.auth.sign_up(email, PASSWORD).await.unwrap();
    state.auth.sign_in(email, PASSWORD).await.unwrap().access_token
}

pub fn with_session(req: TestRequest, token: &str) -> TestRequest {
    req.cookie(Cookie::new(SESSION_COOKIE, token.to_string()))
}
