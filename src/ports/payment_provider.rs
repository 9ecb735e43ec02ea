use crate::domain::entities::{Customer, Order, PaymentProfile};
use crate::domain::errors::{CheckoutError, CheckoutResult};
use crate::domain::value_objects::{CardData, PaymentResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Capability set every payment provider variant implements (card-network
/// processors, wallet processors, bank-transfer processors, ...).
///
/// Error discipline: `process`, `complete` and `pay_from_profile` catch
/// transport faults and gateway declines, logging them and returning a
/// failed `PaymentResult` instead; the order mutation and the log write
/// belong to the provider, never to the caller. Profile management treats
/// gateway rejections as fatal.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Stable identifier used for strategy lookup
    fn identifier(&self) -> &str;

    /// Structural validation of raw card input, before any network call
    fn validate(&self, card: &CardData) -> CheckoutResult<()>;

    /// Performs a purchase for `order.total` in `order.currency`, settling
    /// the order exactly once.
    async fn process(&self, order: &mut Order, card: &CardData) -> CheckoutResult<PaymentResult>;

    /// Whether an off-site redirect by this provider needs an explicit
    /// completion step on return. When true, the orchestrator registers
    /// this provider as the completion callback for the pending attempt.
    fn requires_offsite_completion(&self) -> bool {
        false
    }

    /// Finishes an off-site payment after the customer returned. Providers
    /// that never redirect keep the default, which fails fast when a
    /// completion callback was registered against them by mistake.
    async fn complete(&self, order: &mut Order) -> CheckoutResult<PaymentResult> {
        let _ = order;
        Err(CheckoutError::Configuration(format!(
            "provider '{}' does not support off-site completion",
            self.identifier()
        )))
    }

    /// Whether this provider can store tokenized payment profiles
    fn supports_payment_profiles(&self) -> bool;

    /// Idempotent upsert of the customer's tokenized profile on the
    /// gateway. Gateway rejections during create are fatal here.
    async fn update_payment_profile(
        &self,
        customer: &Customer,
        card: &CardData,
    ) -> CheckoutResult<PaymentProfile>;

    /// Deletes the remote customer record backing a profile. No-op when the
    /// profile holds no customer token.
    async fn delete_payment_profile(&self, profile: &PaymentProfile) -> CheckoutResult<()>;

    /// Charges a stored profile instead of raw card input. Missing tokens
    /// are a fatal integrity error, not a failed result.
    async fn pay_from_profile(
        &self,
        order: &mut Order,
        profile: &PaymentProfile,
    ) -> CheckoutResult<PaymentResult>;
}

/// Strategy lookup for providers, keyed by identifier.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn PaymentProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn PaymentProvider>) {
        self.providers
            .insert(provider.identifier().to_string(), provider);
    }

    pub fn get(&self, identifier: &str) -> CheckoutResult<Arc<dyn PaymentProvider>> {
        self.providers.get(identifier).cloned().ok_or_else(|| {
            CheckoutError::Configuration(format!("no payment provider registered for '{identifier}'"))
        })
    }
}
