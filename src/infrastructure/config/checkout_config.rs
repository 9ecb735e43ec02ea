use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Terminal destinations of a settlement attempt. Success, failure and
/// cancellation each route to their own page, never conflated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    pub success_url: String,
    pub failed_url: String,
    pub cancelled_url: String,
}

impl CheckoutConfig {
    pub fn from_env() -> Arc<Self> {
        Arc::new(Self {
            success_url: std::env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "/done".to_string()),
            failed_url: std::env::var("CHECKOUT_FAILED_URL")
                .unwrap_or_else(|_| "/failed".to_string()),
            cancelled_url: std::env::var("CHECKOUT_CANCELLED_URL")
                .unwrap_or_else(|_| "/cancelled".to_string()),
        })
    }
}
