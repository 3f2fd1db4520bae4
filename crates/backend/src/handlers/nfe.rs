use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use once_cell::sync::Lazy;
use serde_json::json;

use crate::shared::config;

/// Shared HTTP client for the upstream call. The legacy endpoint sits on a
/// slow link, hence the generous timeout.
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
});

fn upstream_error_body(status: u16) -> serde_json::Value {
    json!({ "error": format!("Erro na API upstream: {}", status) })
}

fn transport_error_body() -> serde_json::Value {
    json!({ "error": "Erro ao consultar API de NFe" })
}

/// GET /api/nfe
///
/// Pure pass-through to the VertisConnect endpoint: relays the JSON array on
/// success, mirrors the upstream status code on upstream failure, and
/// translates transport/parse failures into a generic 500. No retries, no
/// caching.
pub async fn get_nfe_controle() -> impl IntoResponse {
    let url = &config::get().upstream.url;

    let response = match HTTP_CLIENT.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Upstream request failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(transport_error_body()));
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("Upstream returned {}", status);
        return (
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(upstream_error_body(status.as_u16())),
        );
    }

    match response.json::<serde_json::Value>().await {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => {
            tracing::error!("Upstream body was not valid JSON: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(transport_error_body()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_body_includes_status() {
        let body = upstream_error_body(503);
        assert_eq!(body["error"], "Erro na API upstream: 503");
    }

    #[test]
    fn test_transport_error_body_is_generic() {
        let body = transport_error_body();
        assert_eq!(body["error"], "Erro ao consultar API de NFe");
    }
}
