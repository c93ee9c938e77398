use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// The single-page client is served from another origin and sends bearer
/// tokens, not cookies, so any origin is accepted.
pub fn api_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}
