use crate::application::dto::{CheckoutOutcome, CheckoutRequest, OffsiteReturnRequest, StagePaymentInputRequest};
use crate::domain::entities::Order;
use crate::domain::errors::{CheckoutError, CheckoutResult};
use crate::domain::events::{DomainEvent, PaymentCompleted, PaymentFailed};
use crate::domain::value_objects::{CardData, PaymentResult};
use crate::infrastructure::crypto::SecretSealer;
use crate::ports::payment_provider::{PaymentProvider, ProviderRegistry};
use crate::ports::session_store_port::PendingAttempt;
use crate::ports::{CartStorePort, OrderRepositoryPort, ProfileStorePort, SessionStorePort};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Per-order advisory locks. The synchronous path and the off-site return
/// path both write the same order fields and must not race.
#[derive(Clone, Default)]
pub struct OrderLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, order_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(order_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Prunes the entry for `order_id` once no settlement path holds its
    /// lock anymore. The map stays bounded by the number of in-flight
    /// attempts.
    async fn release(&self, order_id: Uuid) {
        let mut locks = self.locks.lock().await;
        if let Some(entry) = locks.get(&order_id) {
            // The map's own Arc is the last one standing.
            if Arc::strong_count(entry) == 1 {
                locks.remove(&order_id);
            }
        }
    }
}

/// Payment settlement orchestrator.
///
/// Drives a checkout attempt end-to-end: snapshots the cart into an order
/// at the discount-reduced total, invokes the selected provider and routes
/// the result. Off-site redirects park the attempt behind a single-use
/// correlation token until the external round trip comes back.
pub struct CheckoutService {
    carts: Arc<dyn CartStorePort>,
    orders: Arc<dyn OrderRepositoryPort>,
    profiles: Arc<dyn ProfileStorePort>,
    sessions: Arc<dyn SessionStorePort>,
    providers: ProviderRegistry,
    sealer: SecretSealer,
    locks: OrderLocks,
}

impl CheckoutService {
    pub fn new(
        carts: Arc<dyn CartStorePort>,
        orders: Arc<dyn OrderRepositoryPort>,
        profiles: Arc<dyn ProfileStorePort>,
        sessions: Arc<dyn SessionStorePort>,
        providers: ProviderRegistry,
        sealer: SecretSealer,
    ) -> Self {
        Self {
            carts,
            orders,
            profiles,
            sessions,
            providers,
            sealer,
            locks: OrderLocks::new(),
        }
    }

    /// Validates raw card input through the provider and stages it,
    /// sealed, for the next checkout call on this session.
    pub async fn stage_payment_input(
        &self,
        request: StagePaymentInputRequest,
    ) -> CheckoutResult<()> {
        let provider = self.providers.get(&request.provider)?;
        provider.validate(&request.card)?;

        let sealed = self.sealer.seal(&serde_json::to_vec(&request.card)?)?;
        self.sessions
            .put_staged_input(&request.session_id, sealed)
            .await?;

        debug!("Payment input staged for session {}", request.session_id);
        Ok(())
    }

    /// Settles the cart: snapshot, provider call, outcome routing.
    pub async fn checkout(&self, request: CheckoutRequest) -> CheckoutResult<CheckoutOutcome> {
        info!("Checkout started for cart {}", request.cart_id);

        let cart = self
            .carts
            .find_by_id(request.cart_id)
            .await?
            .ok_or_else(|| CheckoutError::CartNotFound(request.cart_id.to_string()))?;

        if cart.shipping_method.is_none() || cart.payment_method.is_none() {
            return Err(CheckoutError::Integrity(
                "shipping and payment method must be selected before checkout".to_string(),
            ));
        }

        // Staged input is one-time use: taken here, it cannot fund a
        // second order without the customer re-entering it.
        let card = self.take_staged_card(&request.session_id).await?;

        // Monetary amounts are fixed from here on; later cart mutation
        // cannot affect the order.
        let mut order = Order::from_cart(&cart)?;
        self.orders.save(&order).await?;

        let provider = self.providers.get(&order.payment_provider)?;

        let lock = self.locks.lock_for(order.id).await;
        let result = {
            let _guard = lock.lock().await;
            self.invoke_provider(&provider, &mut order, &card).await
        };
        drop(lock);
        self.locks.release(order.id).await;

        self.route_result(&request.session_id, &order, provider.as_ref(), result)
            .await
    }

    /// Handles the return leg of an off-site payment round trip.
    pub async fn handle_offsite_return(
        &self,
        request: OffsiteReturnRequest,
    ) -> CheckoutResult<CheckoutOutcome> {
        // Taking the attempt consumes the correlation token: a replayed
        // return URL finds nothing and lands on the failed outcome.
        let Some(pending) = self
            .sessions
            .take_pending_attempt(&request.session_id)
            .await?
        else {
            warn!("Off-site return without a pending attempt");
            return Ok(CheckoutOutcome::Failed { order_id: None });
        };

        if request.token.as_deref() != Some(pending.correlation_token.as_str()) {
            // Tampered URL or expired session. The callback slot was
            // already cleared along with the attempt.
            warn!(
                "Correlation token mismatch for order {}",
                pending.order_id
            );
            return Ok(CheckoutOutcome::Failed {
                order_id: Some(pending.order_id),
            });
        }

        if request.return_type.as_deref() == Some("cancel") {
            info!("Off-site payment cancelled for order {}", pending.order_id);
            return Ok(CheckoutOutcome::Cancelled {
                order_id: Some(pending.order_id),
            });
        }

        let Some(callback) = &pending.completion_callback else {
            // No completion step required; the gateway only redirects
            // back here once the payment went through.
            info!("Off-site payment completed for order {}", pending.order_id);
            return Ok(CheckoutOutcome::Success {
                order_id: pending.order_id,
            });
        };

        // A provider registered as callback without a real `complete` is a
        // configuration error and must surface, not be guessed around.
        let provider = self.providers.get(callback)?;
        let mut order = self
            .orders
            .find_by_id(pending.order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(pending.order_id.to_string()))?;

        let lock = self.locks.lock_for(order.id).await;
        let result = {
            let _guard = lock.lock().await;
            provider.complete(&mut order).await
        };
        drop(lock);
        self.locks.release(order.id).await;

        let result = result?;
        self.route_result(&request.session_id, &order, provider.as_ref(), Ok(result))
            .await
    }

    /// Decrypts the staged card input. Decode failures degrade to empty
    /// input so the attempt can still charge a stored profile.
    async fn take_staged_card(&self, session_id: &str) -> CheckoutResult<CardData> {
        let Some(sealed) = self.sessions.take_staged_input(session_id).await? else {
            return Ok(CardData::default());
        };

        match self
            .sealer
            .open(&sealed)
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(Into::into))
        {
            Ok(card) => Ok(card),
            Err(e) => {
                warn!("Staged payment input could not be decoded: {}", e);
                Ok(CardData::default())
            }
        }
    }

    /// Runs the provider, falling back to a stored profile when no card
    /// input was staged. Every fault at this boundary becomes a failed
    /// result; the caller always receives a `PaymentResult`.
    async fn invoke_provider(
        &self,
        provider: &Arc<dyn PaymentProvider>,
        order: &mut Order,
        card: &CardData,
    ) -> CheckoutResult<PaymentResult> {
        let outcome = if card.is_empty() && provider.supports_payment_profiles() {
            let profile = self
                .profiles
                .find_for_vendor(order.customer_id, provider.identifier())
                .await?;
            match profile {
                Some(profile) => provider.pay_from_profile(order, &profile).await,
                None => provider.process(order, card).await,
            }
        } else {
            provider.process(order, card).await
        };

        match outcome {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Provider fault during settlement of {}: {}", order.id, e);
                Ok(PaymentResult::failed(order.id, "payment failed"))
            }
        }
    }

    /// Final routing: redirect detour or one of the terminal outcomes.
    async fn route_result(
        &self,
        session_id: &str,
        order: &Order,
        provider: &dyn PaymentProvider,
        result: CheckoutResult<PaymentResult>,
    ) -> CheckoutResult<CheckoutOutcome> {
        let result = result?;

        if let Some(url) = &result.redirect_url {
            // Not final yet: park the attempt behind a fresh single-use
            // correlation token and send the customer off-site.
            let token = Uuid::new_v4().to_string();
            let attempt = PendingAttempt {
                order_id: order.id,
                correlation_token: token.clone(),
                completion_callback: provider
                    .requires_offsite_completion()
                    .then(|| provider.identifier().to_string()),
            };
            self.sessions
                .put_pending_attempt(session_id, attempt)
                .await?;

            return Ok(CheckoutOutcome::Redirect {
                url: url.clone(),
                token,
            });
        }

        if result.successful {
            let event = PaymentCompleted::from_order(order);
            info!(
                "Domain event {}: order {} settled for {}",
                event.event_type(),
                event.order_id,
                order.total.format(&order.currency)
            );
            Ok(CheckoutOutcome::Success { order_id: order.id })
        } else {
            let event = PaymentFailed::new(
                order.id,
                result.message.clone().unwrap_or_else(|| "payment failed".to_string()),
            );
            info!(
                "Domain event {}: order {} failed settlement",
                event.event_type(),
                event.order_id
            );
            Ok(CheckoutOutcome::Failed {
                order_id: Some(order.id),
            })
        }
    }
}
