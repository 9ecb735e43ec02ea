use crate::domain::errors::CheckoutResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pending off-site settlement, correlated to its order by a single-use
/// token. `completion_callback` names the provider that must finish the
/// payment when the customer returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAttempt {
    pub order_id: Uuid,
    pub correlation_token: String,
    pub completion_callback: Option<String>,
}

/// Session-keyed slots for staged payment input and pending off-site
/// attempts. Both `take` operations consume: the value is removed the
/// moment it is read, so a replayed request finds nothing.
#[async_trait]
pub trait SessionStorePort: Send + Sync {
    async fn put_staged_input(&self, session_id: &str, ciphertext: String) -> CheckoutResult<()>;

    /// Removes and returns the staged payment input (single use)
    async fn take_staged_input(&self, session_id: &str) -> CheckoutResult<Option<String>>;

    async fn put_pending_attempt(
        &self,
        session_id: &str,
        attempt: PendingAttempt,
    ) -> CheckoutResult<()>;

    /// Removes and returns the pending attempt (single use)
    async fn take_pending_attempt(
        &self,
        session_id: &str,
    ) -> CheckoutResult<Option<PendingAttempt>>;
}
