use crate::domain::entities::Order;
use crate::domain::errors::CheckoutResult;
use async_trait::async_trait;

/// Order store contract: create-from-snapshot, update payment fields,
/// read current state.
#[async_trait]
pub trait OrderRepositoryPort: Send + Sync {
    /// Persists a freshly snapshotted order
    async fn save(&self, order: &Order) -> CheckoutResult<()>;

    /// Finds an order by its id
    async fn find_by_id(&self, id: uuid::Uuid) -> CheckoutResult<Option<Order>>;

    /// Updates the payment fields of an existing order
    async fn update(&self, order: &Order) -> CheckoutResult<()>;
}
