//! Axum middleware for HTTP request metrics.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, Response, StatusCode},
    middleware::Next,
};
use metrics::{counter, histogram};
use std::time::Instant;

/// Route label for requests that matched no route.
const UNMATCHED: &str = "unmatched";

/// Records per-route request metrics.
///
/// - `http_requests_total{method, path, status_class}`
/// - `http_request_duration_seconds{method, path}`
/// - `http_requests_errors_total{method, path, status}` for 4xx and 5xx
///
/// `path` is the route template, never the raw URI, so label sets stay
/// bounded. Scrapes of `/metrics` are not counted.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/search", get(search))
///     .layer(axum::middleware::from_fn(metrics_middleware));
/// ```
pub async fn metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let route = matched_path.map(|p| p.as_str().to_owned());
    if route.as_deref() == Some("/metrics") {
        return next.run(request).await;
    }

    let method = request.method().as_str().to_owned();
    let path = route.unwrap_or_else(|| UNMATCHED.to_owned());
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status_class" => status_class(status)
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone()
    )
    .record(started.elapsed().as_secs_f64());

    if status.is_client_error() || status.is_server_error() {
        counter!(
            "http_requests_errors_total",
            "method" => method,
            "path" => path,
            "status" => status.as_u16().to_string()
        )
        .increment(1);
    }

    response
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        5 => "5xx",
        _ => "other",
    }
}
