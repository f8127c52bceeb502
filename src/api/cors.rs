use axum::http::{
    Method,
    header::{
        ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderName, ORIGIN,
    },
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Permissive CORS for the mobile and web clients. Preflight requests are
/// answered by the layer and never reach a handler.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ORIGIN,
            CONTENT_TYPE,
            CONTENT_LENGTH,
            ACCEPT,
            ACCEPT_ENCODING,
            AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
        ])
}
