use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Card gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Secret API key sent as a bearer token
    pub api_key: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds. Every gateway call is bounded; an
    /// unbounded call would hold the order in `Pending` indefinitely.
    pub timeout_secs: u64,

    /// Where the gateway sends the customer back after an off-site payment
    pub return_url: String,

    /// Where the gateway sends the customer after cancelling off-site
    pub cancel_url: String,
}

impl GatewayConfig {
    pub fn from_env() -> Arc<Self> {
        Arc::new(Self {
            api_key: std::env::var("GATEWAY_API_KEY").expect("GATEWAY_API_KEY must be set"),
            base_url: std::env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.gateway.example".to_string()),
            timeout_secs: std::env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            return_url: std::env::var("GATEWAY_RETURN_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api/checkout/return".to_string()),
            cancel_url: std::env::var("GATEWAY_CANCEL_URL").unwrap_or_else(|_| {
                "http://localhost:3000/api/checkout/return?type=cancel".to_string()
            }),
        })
    }
}
