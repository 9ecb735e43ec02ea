use crate::domain::discount::{Discount, DiscountApplier, DiscountLedgerEntry, DiscountType};
use crate::domain::errors::{CheckoutError, CheckoutResult};
use crate::domain::value_objects::{CardBrand, Money, PaymentState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cart line referencing a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub category_ids: Vec<Uuid>,
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        Money::from_minor(self.unit_price.to_minor() * i64::from(self.quantity))
    }
}

/// Shipping method selected on the cart. Price is an opaque monetary value;
/// rate computation happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: Uuid,
    pub name: String,
    pub price: Money,
}

/// Payment method selected on the cart, pointing at a provider by identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub name: String,
    pub provider: String,
}

/// Shopping cart as read from the cart store. Read-only for the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub currency: String,
    pub lines: Vec<CartLine>,
    pub shipping_method: Option<ShippingMethod>,
    pub payment_method: Option<PaymentMethod>,
    pub discounts: Vec<Discount>,
}

impl Cart {
    pub fn empty(customer_id: Uuid, currency: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            currency: currency.to_string(),
            lines: Vec::new(),
            shipping_method: None,
            payment_method: None,
            discounts: Vec::new(),
        }
    }

    /// Sum of all line totals, before discounts and shipping.
    pub fn items_total(&self) -> Money {
        Money::from_minor(self.lines.iter().map(|l| l.line_total().to_minor()).sum())
    }

    pub fn contains_product(&self, product_id: Uuid) -> bool {
        self.lines.iter().any(|l| l.product_id == product_id)
    }

    pub fn contains_category(&self, category_id: Uuid) -> bool {
        self.lines
            .iter()
            .any(|l| l.category_ids.contains(&category_id))
    }
}

/// Customer owning carts and payment profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Finalized order, snapshotted from a cart at checkout time. Later cart
/// mutation cannot affect it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub customer_id: Uuid,
    pub currency: String,

    /// Line items after discounts
    pub items_total: Money,

    /// Shipping charge after discounts
    pub shipping_total: Money,

    /// Grand total the customer is charged
    pub total: Money,

    /// Savings recorded during the snapshot, in application order
    pub discount_ledger: Vec<DiscountLedgerEntry>,

    /// Provider identifier selected on the cart
    pub payment_provider: String,

    pub payment_id: Option<Uuid>,

    /// Opaque gateway response snapshot
    pub payment_data: Option<serde_json::Value>,

    pub card_brand: Option<CardBrand>,
    pub card_holder_name: Option<String>,
    pub card_last4: Option<String>,

    pub payment_state: PaymentState,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Snapshots the cart into an order at the discount-reduced total.
    ///
    /// Shipping-type discounts run against the shipping charge only; all
    /// other discounts fold over the items total. Both ledgers are kept,
    /// in application order.
    pub fn from_cart(cart: &Cart) -> CheckoutResult<Self> {
        let shipping_method = cart.shipping_method.as_ref().ok_or_else(|| {
            CheckoutError::Integrity("cart has no shipping method selected".to_string())
        })?;
        let payment_method = cart.payment_method.as_ref().ok_or_else(|| {
            CheckoutError::Integrity("cart has no payment method selected".to_string())
        })?;

        let (shipping_discounts, item_discounts): (Vec<Discount>, Vec<Discount>) = cart
            .discounts
            .iter()
            .cloned()
            .partition(|d| d.discount_type == DiscountType::Shipping);

        let mut item_applier = DiscountApplier::new(cart, cart.items_total());
        item_applier.apply_many(&item_discounts);
        let items_total = item_applier.reduced_total();
        let mut ledger = item_applier.into_ledger();

        let mut shipping_applier =
            DiscountApplier::with_base(cart, shipping_method.price, shipping_method.price);
        shipping_applier.apply_many(&shipping_discounts);
        let shipping_total = shipping_applier.reduced_total();
        ledger.extend(shipping_applier.into_ledger());

        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            cart_id: cart.id,
            customer_id: cart.customer_id,
            currency: cart.currency.clone(),
            items_total,
            shipping_total,
            total: Money::from_minor(items_total.to_minor() + shipping_total.to_minor()),
            discount_ledger: ledger,
            payment_provider: payment_method.provider.clone(),
            payment_id: None,
            payment_data: None,
            card_brand: None,
            card_holder_name: None,
            card_last4: None,
            payment_state: PaymentState::Pending,
            created_at: now,
            updated_at: now,
            paid_at: None,
        })
    }

    /// Records a successful settlement. Re-applying the same terminal
    /// outcome is a no-op; a conflicting outcome is rejected.
    pub fn record_successful_payment(
        &mut self,
        payment_id: Uuid,
        payment_data: serde_json::Value,
        card_brand: Option<CardBrand>,
        card_holder_name: Option<String>,
        card_last4: Option<String>,
    ) -> CheckoutResult<()> {
        match self.payment_state {
            PaymentState::Paid => Ok(()),
            PaymentState::Failed => Err(CheckoutError::InvalidState {
                expected: PaymentState::Pending.to_string(),
                actual: self.payment_state.to_string(),
            }),
            PaymentState::Pending => {
                self.payment_id = Some(payment_id);
                self.payment_data = Some(payment_data);
                self.card_brand = card_brand;
                self.card_holder_name = card_holder_name;
                self.card_last4 = card_last4;
                self.payment_state = PaymentState::Paid;
                self.paid_at = Some(Utc::now());
                self.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    /// Records a failed settlement, with the same idempotency rules.
    pub fn record_failed_payment(&mut self) -> CheckoutResult<()> {
        match self.payment_state {
            PaymentState::Failed => Ok(()),
            PaymentState::Paid => Err(CheckoutError::InvalidState {
                expected: PaymentState::Pending.to_string(),
                actual: self.payment_state.to_string(),
            }),
            PaymentState::Pending => {
                self.payment_state = PaymentState::Failed;
                self.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self.payment_state,
            PaymentState::Paid | PaymentState::Failed
        )
    }
}

/// Gateway-side tokens backing a payment profile. Stored encrypted at rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileTokens {
    pub customer_token: Option<String>,
    pub card_token: Option<String>,
}

impl ProfileTokens {
    pub fn is_complete(&self) -> bool {
        self.customer_token.is_some() && self.card_token.is_some()
    }
}

/// Tokenized card profile reusable for future charges. At most one profile
/// per customer is primary; the profile store enforces that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProfile {
    pub id: Uuid,
    pub customer_id: Uuid,

    /// Identifier of the provider that owns the tokens
    pub vendor_id: String,

    pub tokens: ProfileTokens,

    pub card_brand: Option<CardBrand>,
    pub card_expiry_month: Option<u32>,
    pub card_expiry_year: Option<i32>,
    pub card_last4: String,

    pub is_primary: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentProfile {
    pub fn new(customer_id: Uuid, vendor_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            vendor_id: vendor_id.to_string(),
            tokens: ProfileTokens::default(),
            card_brand: None,
            card_expiry_month: None,
            card_expiry_year: None,
            card_last4: String::new(),
            is_primary: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the gateway tokens and the last four digits of the PAN.
    pub fn set_profile_data(&mut self, tokens: ProfileTokens, pan: &str) {
        self.tokens = tokens;
        let len = pan.len();
        self.card_last4 = pan.get(len.saturating_sub(4)..).unwrap_or("").to_string();
        self.updated_at = Utc::now();
    }
}
