//! Signed object downloads.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::middleware::auth::Lang;
use crate::middleware::error::{AppResult, Localize};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    #[serde(default)]
    token: String,
}

/// GET /storage/{path}?token=
pub async fn serve_object(
    state: web::Data<AppState>,
    Lang(locale): Lang,
    path: web::Path<String>,
    query: web::Query<SignedQuery>,
) -> AppResult<HttpResponse> {
    let object = state
        .storage
        .open_signed(&path, &query.token)
        .await
        .localized(locale)?;

    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(object.bytes))
}
