//! Middleware for the Linkpage API.

use actix_web::middleware::Logger;
use actix_cors::Cors;

/// Standard request logging:
/// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

/// CORS for editor front ends served from another origin. Pages and the
/// JSON API are read-publicly anyway; writes are gated by bearer tokens.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600)
}
