//! Administrator profile.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Profile, ProfileChanges};
use quill_shared::ApiResponse;
use quill_shared::dto::{ProfileResponse, UpdateProfileRequest};

use crate::middleware::auth::{AdminIdentity, Lang};
use crate::middleware::error::{AppResult, Localize};
use crate::state::AppState;

fn profile_response(profile: Profile, email: String) -> ProfileResponse {
    ProfileResponse {
        id: profile.id,
        email,
        name: profile.name,
        display_name: profile.display_name,
        avatar_url: profile.avatar_url,
        website: profile.website,
        bio: profile.bio,
        updated_at: profile.updated_at,
    }
}

/// GET /admin/profile
pub async fn get_profile(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    Lang(locale): Lang,
) -> AppResult<HttpResponse> {
    let profile = state
        .profiles
        .get_or_create(admin.user_id, &admin.email)
        .await
        .localized(locale)?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(profile_response(profile, admin.email))))
}

/// PUT /admin/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    Lang(locale): Lang,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = ProfileChanges {
        name: req.name,
        display_name: req.display_name,
        avatar_url: req.avatar_url,
        website: req.website,
        bio: req.bio,
    };
    let profile = state
        .profiles
        .update(admin.user_id, &admin.email, changes)
        .await
        .localized(locale)?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(profile_response(profile, admin.email))))
}
