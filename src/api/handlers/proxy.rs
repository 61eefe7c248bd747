//! Passthrough proxy for browser clients that cannot call the upstream
//! API directly.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::dto::{ProxyErrorResponse, ProxyQuery};
use crate::app_state::AppState;

/// `Cache-Control` value of successful proxy responses.
pub const PROXY_CACHE_CONTROL: &str = "public, s-maxage=30, stale-while-revalidate=60";

/// Rejects anything that could escape the configured upstream base.
fn validate_path(path: Option<&str>) -> Result<&str, &'static str> {
    let path = path.map(str::trim).unwrap_or_default();
    if path.is_empty() {
        return Err("Missing path parameter");
    }
    if path.contains("://") || path.starts_with("//") || path.contains('\\') {
        return Err("Path must be relative to the upstream API");
    }
    Ok(path)
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    response
}

fn proxy_error(status: StatusCode, error: &str, message: Option<String>) -> Response {
    let body = ProxyErrorResponse {
        error: error.to_string(),
        message,
    };
    with_cors((status, Json(body)).into_response())
}

/// `GET /api/proxy?path=...`: Fetch an upstream resource verbatim.
#[utoipa::path(
    get,
    path = "/api/proxy",
    tag = "Proxy",
    summary = "Proxy an upstream resource",
    description = "Fetches the given upstream path and returns its JSON body unchanged, with permissive CORS and short shared-cache headers.",
    params(ProxyQuery),
    responses(
        (status = 200, description = "Upstream JSON body", body = serde_json::Value),
        (status = 400, description = "Missing or non-relative path", body = ProxyErrorResponse),
        (status = 500, description = "Upstream fetch failed", body = ProxyErrorResponse),
    )
)]
pub async fn proxy(State(state): State<AppState>, Query(query): Query<ProxyQuery>) -> Response {
    let path = match validate_path(query.path.as_deref()) {
        Ok(path) => path,
        Err(reason) => return proxy_error(StatusCode::BAD_REQUEST, reason, None),
    };

    match state.upstream.fetch_resource(path).await {
        Ok(body) => {
            let mut response = with_cors(Json(body).into_response());
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static(PROXY_CACHE_CONTROL));
            response
        }
        Err(err) => {
            tracing::warn!(%path, error = %err, "proxy fetch failed");
            proxy_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch from upstream",
                Some(err.to_string()),
            )
        }
    }
}
