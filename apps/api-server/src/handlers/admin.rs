//! Back-office post management. Every handler runs as the administrator and
//! only ever touches posts that account owns.

use actix_web::{HttpResponse, web};

use quill_core::domain::{PostDraft, PostId, PostPatch};
use quill_shared::dto::{CreatePostRequest, DeleteResponse, PostResponse, UpdatePostRequest};
use quill_shared::{ApiResponse, MessageKey};

use super::posts::post_response;
use crate::middleware::auth::{AdminIdentity, Lang};
use crate::middleware::error::{AppResult, Localize};
use crate::state::AppState;

/// GET /admin/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    Lang(locale): Lang,
) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .list_owned_posts(admin.user_id)
        .await
        .localized(locale)?;
    let body: Vec<PostResponse> = posts.into_iter().map(post_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /admin/posts
pub async fn create_post(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    Lang(locale): Lang,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = PostDraft {
        title: req.title,
        slug: req.slug,
        content: req.content,
        cover_url: req.cover_url,
    };
    let post = state
        .posts
        .create_post(draft, admin.user_id)
        .await
        .localized(locale)?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        post_response(post),
        MessageKey::PostSaved.text(locale),
    )))
}

/// GET /admin/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    Lang(locale): Lang,
    id: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .get_owned_post(id.into_inner(), admin.user_id)
        .await
        .localized(locale)?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// PUT /admin/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    Lang(locale): Lang,
    id: web::Path<PostId>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        slug: req.slug,
        content: req.content,
        cover_url: req.cover_url,
    };
    let post = state
        .posts
        .update_post(id.into_inner(), admin.user_id, patch)
        .await
        .localized(locale)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post_response(post),
        MessageKey::PostSaved.text(locale),
    )))
}

/// DELETE /admin/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    Lang(locale): Lang,
    id: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let deleted = state
        .posts
        .delete_post(id.into_inner(), admin.user_id)
        .await
        .localized(locale)?;

    let body = DeleteResponse { deleted };
    Ok(HttpResponse::Ok().json(if deleted {
        ApiResponse::ok_with_message(body, MessageKey::PostDeleted.text(locale))
    } else {
        ApiResponse::ok(body)
    }))
}
