use crate::domain::errors::CheckoutResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged settlement attempt. Failed entries keep the full diagnostic
/// payload; it is never exposed to the end user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLogEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub successful: bool,
    pub payload: serde_json::Value,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Append-only log of payment and failed-payment records.
#[async_trait]
pub trait PaymentLogPort: Send + Sync {
    /// Logs a successful payment, returning the record id
    async fn log_successful(
        &self,
        order_id: Uuid,
        payload: &serde_json::Value,
    ) -> CheckoutResult<Uuid>;

    /// Logs a failed payment with its raw failure context
    async fn log_failed(
        &self,
        order_id: Uuid,
        payload: &serde_json::Value,
        message: &str,
    ) -> CheckoutResult<Uuid>;
}
