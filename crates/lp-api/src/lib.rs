//! # lp-api
//!
//! The web routing and orchestration layer for Linkpage.

pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the Linkpage routes.
///
/// The `/api` scope is registered before the catch-all public page route,
/// so `api` can never be claimed as a page path even though it would pass
/// name validation.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/profiles", web::post().to(handlers::save_profile))
            .route("/profiles/{name}", web::get().to(handlers::get_profile))
            .route("/availability/{name}", web::get().to(handlers::check_availability))
            .route("/me/page", web::get().to(handlers::my_page))
            .route("/uploads/{kind}", web::post().to(handlers::upload_asset)),
    )
    .route("/{name}", web::get().to(handlers::view_page));
}
