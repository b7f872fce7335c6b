//! Cache-Control headers for catalog reads.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Mark successful responses as cacheable for `max_age_sec` seconds.
/// Errors are never cached.
pub async fn http_cache(
    State(max_age_sec): State<usize>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", max_age_sec)) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    response
}
