//! Login page data.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_shared::MessageKey;
use quill_shared::dto::{LoginView, Notice};

use crate::middleware::auth::Lang;

/// Where a signed-in administrator lands by default.
pub const DEFAULT_REDIRECT: &str = "/admin/posts";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    redirect: Option<String>,
    error: Option<String>,
}

/// Keep post-login redirects on this site: a local absolute path, never a
/// protocol-relative or backslash-smuggled URL.
pub fn safe_redirect(target: Option<&str>) -> String {
    match target.map(str::trim) {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path.to_string()
        }
        _ => DEFAULT_REDIRECT.to_string(),
    }
}

/// GET /login?redirect=&error=
pub async fn login_page(query: web::Query<LoginQuery>, Lang(locale): Lang) -> HttpResponse {
    let notice = query
        .error
        .as_deref()
        .and_then(MessageKey::from_code)
        .map(|key| Notice {
            code: key.code().to_string(),
            message: key.text(locale).to_string(),
        });

    HttpResponse::Ok().json(LoginView {
        redirect: safe_redirect(query.redirect.as_deref()),
        locale,
        notice,
    })
}
