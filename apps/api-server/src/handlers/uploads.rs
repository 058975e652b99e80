//! Cover image uploads.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};

use quill_shared::dto::CoverUploadResponse;

use crate::middleware::auth::{AdminIdentity, Lang};
use crate::middleware::error::{AppError, AppResult, Localize};
use crate::state::AppState;

/// Largest accepted cover image, in bytes.
pub const MAX_COVER_BYTES: usize = 5 * 1024 * 1024;

/// Header carrying the client-side file name.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// POST /admin/uploads/cover
///
/// The request body is the raw image. The stored object name is derived from
/// the extension of `X-File-Name`.
pub async fn upload_cover(
    req: HttpRequest,
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    Lang(locale): Lang,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let file_name = req
        .headers()
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::validation("X-File-Name header is required").localized(locale))?;

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.starts_with("image/"))
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .to_string()
        });

    let upload = state
        .covers
        .upload(file_name, &body, &content_type)
        .await
        .localized(locale)?;

    Ok(HttpResponse::Created().json(CoverUploadResponse {
        path: upload.path,
        url: upload.signed_url,
    }))
}
