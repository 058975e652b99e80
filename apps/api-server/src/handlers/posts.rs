//! Public post endpoints.

use actix_web::{HttpResponse, web};

use quill_core::domain::Post;
use quill_shared::ApiResponse;
use quill_shared::dto::PostResponse;

use crate::middleware::auth::Lang;
use crate::middleware::error::{AppError, AppResult, Localize};
use crate::state::AppState;

pub(crate) fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        content: post.content,
        cover_url: post.cover_url,
        user_id: post.user_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>, Lang(locale): Lang) -> AppResult<HttpResponse> {
    let posts = state.posts.list_all_posts().await.localized(locale)?;
    let body: Vec<PostResponse> = posts.into_iter().map(post_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// GET /api/posts/{slug}
pub async fn get_post(
    state: web::Data<AppState>,
    Lang(locale): Lang,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .get_post_by_slug(&slug)
        .await
        .localized(locale)?
        .ok_or_else(|| AppError::not_found().localized(locale))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}
