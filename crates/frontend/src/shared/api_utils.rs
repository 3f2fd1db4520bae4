//! API endpoint resolution.
//!
//! Local development talks straight to the legacy endpoint; any deployed
//! host goes through the backend proxy to avoid mixed-content/CORS issues.

/// Legacy VertisConnect endpoint, reachable directly from a developer machine.
const UPSTREAM_URL: &str =
    "http://177.11.209.38/vertis/VertisConnect.dll/api/V1.1/get_nfe_controle";

/// Proxy route served by the backend.
const PROXY_PATH: &str = "/api/nfe";

/// Resolve the URL the dashboard fetches from. `localhost` / `127.0.0.1`
/// hit the upstream directly; everything else (including no window at all)
/// uses the proxy. Computed once on mount; not reactive.
pub fn resolve_api_url() -> String {
    let hostname = web_sys::window()
        .and_then(|w| w.location().hostname().ok())
        .unwrap_or_default();

    if hostname == "localhost" || hostname == "127.0.0.1" {
        UPSTREAM_URL.to_string()
    } else {
        PROXY_PATH.to_string()
    }
}
