use crate::domain::entities::{Customer, PaymentProfile};
use crate::domain::errors::CheckoutResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Customer/profile store contract. The store enforces the
/// single-primary-per-customer invariant: making one profile primary
/// atomically clears the flag on all of the customer's other profiles.
#[async_trait]
pub trait ProfileStorePort: Send + Sync {
    async fn find_customer(&self, customer_id: Uuid) -> CheckoutResult<Option<Customer>>;

    async fn find_by_id(&self, id: Uuid) -> CheckoutResult<Option<PaymentProfile>>;

    async fn find_by_customer(&self, customer_id: Uuid) -> CheckoutResult<Vec<PaymentProfile>>;

    /// Finds the customer's profile for a given provider
    async fn find_for_vendor(
        &self,
        customer_id: Uuid,
        vendor_id: &str,
    ) -> CheckoutResult<Option<PaymentProfile>>;

    async fn save(&self, profile: &PaymentProfile) -> CheckoutResult<()>;

    async fn update(&self, profile: &PaymentProfile) -> CheckoutResult<()>;

    async fn delete(&self, id: Uuid) -> CheckoutResult<()>;

    /// Marks the profile primary and clears the flag on its siblings
    async fn make_primary(&self, id: Uuid, customer_id: Uuid) -> CheckoutResult<()>;
}
