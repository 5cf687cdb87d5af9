//! # quill-api
//!
//! The procedure layer for Quill: typed input contracts, per-operation
//! authorization, and the HTTP routing that exposes them.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod procedures;
pub mod session;

use actix_web::web;

/// Configures the RPC routes.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the surface under a different prefix if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/me", web::get().to(handlers::me))
                    .route("/logout", web::post().to(handlers::logout)),
            )
            .service(
                web::scope("/blog")
                    .route("/posts", web::get().to(handlers::list))
                    .route("/posts", web::post().to(handlers::create))
                    .route("/posts/{slug}", web::get().to(handlers::get_by_slug))
                    .route("/posts/{id}", web::patch().to(handlers::update))
                    .route("/posts/{id}", web::delete().to(handlers::delete))
                    .route("/admin/posts/{id}", web::get().to(handlers::get_by_id))
                    .route("/search", web::get().to(handlers::search))
                    .route("/categories", web::get().to(handlers::categories))
                    .route("/category/{category}", web::get().to(handlers::by_category))
                    .route("/series", web::get().to(handlers::series))
                    .route("/series/{series_name}", web::get().to(handlers::by_series)),
            ),
    );
}
