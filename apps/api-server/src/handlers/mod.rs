//! HTTP handlers and route configuration.

/// A gated test service over `configure_routes`, built from an `AppState`.
#[cfg(test)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .wrap(crate::middleware::session_gate::SessionGateMiddleware::new(
                    $state.gate.clone(),
                    std::sync::Arc::clone(&$state.auth),
                ))
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}

mod admin;
mod auth;
mod health;
mod login_view;
mod posts;
mod profile;
mod storage;
mod uploads;

#[cfg(test)]
pub(crate) mod testing;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(login_view::login_page))
        .route("/storage/{path:.*}", web::get().to(storage::serve_object))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                .route("/posts", web::get().to(posts::list_posts))
                .route("/posts/{slug}", web::get().to(posts::get_post))
                // Auth routes
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/logout", web::post().to(auth::logout))
                        .route("/session", web::get().to(auth::session))
                        .route("/refresh", web::post().to(auth::refresh)),
                ),
        )
        .service(
            // Gated by the session gate middleware and the AdminIdentity extractor.
            web::scope("/admin")
                .service(
                    web::resource("/posts")
                        .route(web::get().to(admin::list_posts))
                        .route(web::post().to(admin::create_post)),
                )
                .service(
                    web::resource("/posts/{id}")
                        .route(web::get().to(admin::get_post))
                        .route(web::put().to(admin::update_post))
                        .route(web::delete().to(admin::delete_post)),
                )
                .service(
                    web::resource("/uploads/cover")
                        .app_data(web::PayloadConfig::new(uploads::MAX_COVER_BYTES))
                        .route(web::post().to(uploads::upload_cover)),
                )
                .service(
                    web::resource("/profile")
                        .route(web::get().to(profile::get_profile))
                        .route(web::put().to(profile::update_profile)),
                ),
        );
}
