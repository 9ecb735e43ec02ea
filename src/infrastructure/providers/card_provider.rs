use crate::domain::entities::{Customer, Order, PaymentProfile, ProfileTokens};
use crate::domain::errors::{CheckoutError, CheckoutResult};
use crate::domain::value_objects::{CardBrand, CardData, PaymentResult, PaymentState};
use crate::infrastructure::config::GatewayConfig;
use crate::ports::gateway_port::{GatewayTransport, PurchaseRequest, PurchaseSource};
use crate::ports::order_repository_port::OrderRepositoryPort;
use crate::ports::payment_log_port::PaymentLogPort;
use crate::ports::payment_provider::PaymentProvider;
use crate::ports::profile_store_port::ProfileStorePort;
use async_trait::async_trait;
use chrono::Datelike;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Card display fields recorded on the order after a successful charge.
struct CardDisplay {
    brand: Option<CardBrand>,
    holder: Option<String>,
    last4: Option<String>,
}

/// Card-network payment provider over the REST gateway.
///
/// Owns every order mutation during settlement: callers hand in the order
/// and receive a `PaymentResult`, never an exception, for charge
/// operations. Profile management is stricter and lets gateway rejections
/// surface as errors.
pub struct CardProvider {
    gateway: Arc<dyn GatewayTransport>,
    orders: Arc<dyn OrderRepositoryPort>,
    payment_log: Arc<dyn PaymentLogPort>,
    profiles: Arc<dyn ProfileStorePort>,
    config: Arc<GatewayConfig>,
}

impl CardProvider {
    pub fn new(
        gateway: Arc<dyn GatewayTransport>,
        orders: Arc<dyn OrderRepositoryPort>,
        payment_log: Arc<dyn PaymentLogPort>,
        profiles: Arc<dyn ProfileStorePort>,
        config: Arc<GatewayConfig>,
    ) -> Self {
        Self {
            gateway,
            orders,
            payment_log,
            profiles,
            config,
        }
    }

    /// Result reflecting an already settled order, without touching the
    /// gateway or the log again.
    fn settled_result(&self, order: &Order) -> PaymentResult {
        PaymentResult {
            successful: order.payment_state == PaymentState::Paid,
            payment_id: order.payment_id,
            order_id: Some(order.id),
            message: (order.payment_state == PaymentState::Failed)
                .then(|| "payment failed".to_string()),
            ..PaymentResult::default()
        }
    }

    /// Shared charge path for raw card input and stored profiles.
    async fn charge(
        &self,
        order: &mut Order,
        source: PurchaseSource,
        display: CardDisplay,
    ) -> CheckoutResult<PaymentResult> {
        if order.is_settled() {
            debug!("Order {} already settled, returning recorded outcome", order.id);
            return Ok(self.settled_result(order));
        }

        let request = PurchaseRequest {
            amount_minor: order.total.to_minor(),
            currency: order.currency.clone(),
            source,
            return_url: self.config.return_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
        };

        let response = match self.gateway.purchase(request).await {
            Ok(response) => response,
            Err(fault) => {
                // Transport faults stop here. Full detail goes to the
                // failed-payment log; the caller sees a failed result.
                warn!("Gateway transport fault for order {}: {}", order.id, fault);
                let failed_id = self
                    .payment_log
                    .log_failed(order.id, &json!({}), &fault.to_string())
                    .await?;
                return Ok(PaymentResult {
                    successful: false,
                    failed_payment_id: Some(failed_id),
                    order_id: Some(order.id),
                    message: Some("payment failed".to_string()),
                    ..PaymentResult::default()
                });
            }
        };

        if let Some(url) = response.redirect_url() {
            // Off-site flow: the outcome is not final yet, so the order
            // stays pending and nothing is logged.
            debug!("Order {} redirects off-site", order.id);
            return Ok(PaymentResult {
                successful: false,
                redirect_url: Some(url.to_string()),
                order_id: Some(order.id),
                ..PaymentResult::default()
            });
        }

        if response.successful {
            let payment_id = self
                .payment_log
                .log_successful(order.id, &response.data)
                .await?;
            order.record_successful_payment(
                payment_id,
                response.data,
                display.brand,
                display.holder,
                display.last4,
            )?;
            self.orders.update(order).await?;

            info!("Order {} paid", order.id);
            Ok(PaymentResult {
                successful: true,
                payment_id: Some(payment_id),
                order_id: Some(order.id),
                ..PaymentResult::default()
            })
        } else {
            let detail = response
                .error_message()
                .unwrap_or("gateway declined the charge")
                .to_string();
            let failed_id = self
                .payment_log
                .log_failed(order.id, &response.data, &detail)
                .await?;
            order.record_failed_payment()?;
            self.orders.update(order).await?;

            info!("Order {} failed settlement", order.id);
            Ok(PaymentResult {
                successful: false,
                failed_payment_id: Some(failed_id),
                order_id: Some(order.id),
                message: Some("payment failed".to_string()),
                ..PaymentResult::default()
            })
        }
    }

    /// Resolves the remote customer token, probing an existing one and
    /// recreating it when the gateway no longer knows the customer.
    async fn upsert_remote_customer(
        &self,
        customer: &Customer,
        existing: Option<&String>,
    ) -> CheckoutResult<String> {
        if let Some(token) = existing {
            let response = self.gateway.fetch_customer(token).await?;
            let deleted = response.data["deleted"].as_bool().unwrap_or(false);
            if response.successful && !deleted {
                return Ok(token.clone());
            }
            debug!("Remote customer {} is gone, recreating", token);
        }

        let response = self
            .gateway
            .create_customer(&customer.name, &customer.email)
            .await?;
        if !response.successful {
            return Err(CheckoutError::GatewayRejection(
                "gateway createCustomer failed".to_string(),
            ));
        }
        response
            .reference()
            .map(String::from)
            .ok_or_else(|| {
                CheckoutError::GatewayRejection(
                    "gateway createCustomer returned no reference".to_string(),
                )
            })
    }

    /// Resolves the remote card token: update the existing one, fall back
    /// to creating a new token when the gateway rejects the update.
    async fn upsert_remote_card(
        &self,
        customer_token: &str,
        existing: Option<&String>,
        card: &CardData,
    ) -> CheckoutResult<String> {
        if let Some(token) = existing {
            let response = self
                .gateway
                .update_card(customer_token, token, card)
                .await?;
            if response.successful {
                return Ok(token.clone());
            }
            debug!("Card token {} rejected on update, creating a new one", token);
        }

        let response = self.gateway.create_card(customer_token, card).await?;
        if !response.successful {
            return Err(CheckoutError::GatewayRejection(
                "gateway createCard failed".to_string(),
            ));
        }
        response.reference().map(String::from).ok_or_else(|| {
            CheckoutError::GatewayRejection("gateway createCard returned no reference".to_string())
        })
    }
}

#[async_trait]
impl PaymentProvider for CardProvider {
    fn name(&self) -> &str {
        "Card"
    }

    fn identifier(&self) -> &str {
        "card"
    }

    fn validate(&self, card: &CardData) -> CheckoutResult<()> {
        if card.number.is_empty() || !card.number.chars().all(|c| c.is_ascii_digit()) {
            return Err(CheckoutError::Validation(
                "card number must contain only digits".to_string(),
            ));
        }
        if !(12..=19).contains(&card.number.len()) {
            return Err(CheckoutError::Validation(
                "card number must be 12-19 digits".to_string(),
            ));
        }
        if !(1..=12).contains(&card.expiry_month) {
            return Err(CheckoutError::Validation(
                "expiry month must be between 1 and 12".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        let expired = card.expiry_year < now.year()
            || (card.expiry_year == now.year() && card.expiry_month < now.month());
        if expired {
            return Err(CheckoutError::Validation("card has expired".to_string()));
        }

        if !(3..=4).contains(&card.cvv.len()) || !card.cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(CheckoutError::Validation(
                "cvv must be 3 or 4 digits".to_string(),
            ));
        }

        Ok(())
    }

    async fn process(&self, order: &mut Order, card: &CardData) -> CheckoutResult<PaymentResult> {
        let display = CardDisplay {
            brand: Some(card.brand()),
            holder: Some(card.holder_name()),
            last4: Some(card.last4()),
        };
        self.charge(order, PurchaseSource::Card(card.clone()), display)
            .await
    }

    fn supports_payment_profiles(&self) -> bool {
        true
    }

    async fn update_payment_profile(
        &self,
        customer: &Customer,
        card: &CardData,
    ) -> CheckoutResult<PaymentProfile> {
        self.validate(card)?;

        let existing = self
            .profiles
            .find_for_vendor(customer.id, self.identifier())
            .await?;
        let had_any_profile = !self.profiles.find_by_customer(customer.id).await?.is_empty();

        let customer_token = self
            .upsert_remote_customer(customer, existing.as_ref().and_then(|p| p.tokens.customer_token.as_ref()))
            .await?;
        let card_token = self
            .upsert_remote_card(
                &customer_token,
                existing.as_ref().and_then(|p| p.tokens.card_token.as_ref()),
                card,
            )
            .await?;

        let is_new = existing.is_none();
        let mut profile = existing.unwrap_or_else(|| {
            let mut profile = PaymentProfile::new(customer.id, self.identifier());
            // First profile ever becomes the primary one.
            profile.is_primary = !had_any_profile;
            profile
        });

        profile.card_brand = Some(card.brand());
        profile.card_expiry_month = Some(card.expiry_month);
        profile.card_expiry_year = Some(card.expiry_year);
        profile.set_profile_data(
            ProfileTokens {
                customer_token: Some(customer_token),
                card_token: Some(card_token),
            },
            &card.number,
        );

        if is_new {
            self.profiles.save(&profile).await?;
            if profile.is_primary {
                self.profiles
                    .make_primary(profile.id, customer.id)
                    .await?;
            }
        } else {
            self.profiles.update(&profile).await?;
        }

        info!("Payment profile upserted for customer {}", customer.id);
        Ok(profile)
    }

    async fn delete_payment_profile(&self, profile: &PaymentProfile) -> CheckoutResult<()> {
        let Some(customer_token) = &profile.tokens.customer_token else {
            // Nothing remote to clean up.
            return Ok(());
        };

        let response = self.gateway.delete_customer(customer_token).await?;
        if !response.successful {
            return Err(CheckoutError::GatewayRejection(
                "gateway deleteCustomer failed".to_string(),
            ));
        }

        info!("Remote customer record deleted for profile {}", profile.id);
        Ok(())
    }

    async fn pay_from_profile(
        &self,
        order: &mut Order,
        profile: &PaymentProfile,
    ) -> CheckoutResult<PaymentResult> {
        let (Some(customer_token), Some(card_token)) = (
            profile.tokens.customer_token.clone(),
            profile.tokens.card_token.clone(),
        ) else {
            // Fatal: a profile without tokens cannot charge anything, and
            // the order must stay untouched.
            return Err(CheckoutError::Integrity(
                "payment profile is missing gateway tokens".to_string(),
            ));
        };

        let display = CardDisplay {
            brand: profile.card_brand,
            holder: None,
            last4: Some(profile.card_last4.clone()),
        };
        self.charge(
            order,
            PurchaseSource::Profile {
                customer_token,
                card_token,
            },
            display,
        )
        .await
    }
}
