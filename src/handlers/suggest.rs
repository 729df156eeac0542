use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::{Extensions, HeaderMap},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use crate::error::FusionError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{FusionRequest, FusionResponse};
use crate::state::AppState;

// Rate-limit bucket. The forwarded address only counts behind a trusted
// proxy; otherwise the peer address, else one shared bucket.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    trust_forwarded
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "global".to_string())
}

pub async fn suggest_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    extensions: Extensions,
    payload: Result<Json<FusionRequest>, JsonRejection>,
) -> Result<Json<FusionResponse>, FusionError> {
    REQUEST_TOTAL.inc();

    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    if !state
        .rate_limiter
        .check(&client_key(&headers, peer, state.trust_forwarded))
    {
        return Err(FusionError::RateLimited);
    }

    let Json(request) = payload.map_err(|e| FusionError::Validation(e.body_text()))?;

    let start_time = Instant::now();
    let result = state.service.suggest(request).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    result.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers
    }

    #[test]
    fn client_key_uses_peer_address_by_default() {
        let peer: SocketAddr = "198.51.100.4:52311".parse().unwrap();
        assert_eq!(client_key(&forwarded(), Some(peer), false), "198.51.100.4");
        assert_eq!(client_key(&HeaderMap::new(), None, false), "global");
        assert_eq!(client_key(&forwarded(), None, false), "global");
    }

    #[test]
    fn client_key_honours_forwarded_address_behind_trusted_proxy() {
        let peer: SocketAddr = "10.0.0.1:8080".parse().unwrap();
        assert_eq!(client_key(&forwarded(), Some(peer), true), "203.0.113.7");
        assert_eq!(client_key(&HeaderMap::new(), Some(peer), true), "10.0.0.1");
    }
}
