use crate::domain::entities::Cart;
use crate::domain::errors::CheckoutResult;
use async_trait::async_trait;

/// Cart store contract. Strictly read-only from the core's perspective:
/// cart mutation happens elsewhere.
#[async_trait]
pub trait CartStorePort: Send + Sync {
    async fn find_by_id(&self, id: uuid::Uuid) -> CheckoutResult<Option<Cart>>;
}
