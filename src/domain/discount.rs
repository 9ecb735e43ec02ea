use crate::domain::entities::{Cart, CartLine};
use crate::domain::value_objects::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Condition class that makes a discount eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTrigger {
    /// Cart total reached a threshold
    Total,
    /// Promo code entered by the customer (code matching happens upstream)
    Code,
    /// A specific product is in the cart
    Product,
    /// A product of a specific category is in the cart
    Category,
}

/// Effect class of an eligible discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Flat amount off
    FixedAmount,
    /// Percentage off the original total
    Rate,
    /// Fixed alternate price per discountable line (or for the whole cart)
    AlternatePrice,
    /// Fixed shipping price, replacing the shipping charge
    Shipping,
}

/// Promotional rule. Exactly the per-currency sub-value matching
/// `discount_type` is meaningful; the others are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub trigger: DiscountTrigger,
    pub discount_type: DiscountType,
    pub number_of_usages: u32,
    pub max_number_of_usages: Option<u32>,
    pub product_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Percentage for `Rate` discounts
    pub rate: Option<f64>,
    /// Flat amount per currency code, for `FixedAmount`
    pub amounts: HashMap<String, i64>,
    /// Alternate line price per currency code, for `AlternatePrice`
    pub alternate_prices: HashMap<String, i64>,
    /// Shipping price per currency code, for `Shipping`
    pub shipping_prices: HashMap<String, i64>,
    /// Threshold per currency code, for the `Total` trigger
    pub totals_to_reach: HashMap<String, i64>,
}

impl Discount {
    pub fn amount(&self, currency: &str) -> Money {
        Money::from_minor(self.amounts.get(currency).copied().unwrap_or(0))
    }

    pub fn alternate_price(&self, currency: &str) -> Money {
        Money::from_minor(self.alternate_prices.get(currency).copied().unwrap_or(0))
    }

    pub fn shipping_price(&self, currency: &str) -> Money {
        Money::from_minor(self.shipping_prices.get(currency).copied().unwrap_or(0))
    }

    pub fn total_to_reach(&self, currency: &str) -> Money {
        Money::from_minor(self.totals_to_reach.get(currency).copied().unwrap_or(0))
    }

    /// Whether this discount currently applies to the cart. First matching
    /// rule wins; the usage cap overrides every trigger.
    pub fn is_eligible(&self, cart: &Cart, running_total: Money) -> bool {
        if let Some(max) = self.max_number_of_usages {
            if self.number_of_usages >= max {
                return false;
            }
        }

        match self.trigger {
            DiscountTrigger::Total => running_total >= self.total_to_reach(&cart.currency),
            DiscountTrigger::Product => self
                .product_id
                .is_some_and(|id| cart.contains_product(id)),
            DiscountTrigger::Category => self
                .category_id
                .is_some_and(|id| cart.contains_category(id)),
            // Code discounts were matched against user input upstream.
            DiscountTrigger::Code => true,
        }
    }
}

/// One recorded application of a discount. Savings carry the sign of their
/// effect on the total, so a reduction is stored negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountLedgerEntry {
    pub discount_id: Uuid,
    pub discount_name: String,
    pub savings: i64,
    pub savings_formatted: String,
}

/// Outcome of applying a single discount to the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Applied; later discounts may still apply
    Applied,
    /// Not eligible; no ledger entry, total unchanged
    Skipped,
    /// Applied and fixes the final amount; the batch must halt here.
    /// No current discount type produces this outcome.
    AppliedAndTerminal,
}

/// Folds an ordered set of discounts into a reduced total.
///
/// `total` is the immutable pre-discount reference point that `Rate` and
/// `AlternatePrice` compute against; `reduced_total` is the running value.
/// The applier never clamps the running total at zero.
#[derive(Debug)]
pub struct DiscountApplier<'a> {
    cart: &'a Cart,
    total: Money,
    reduced_total: Money,
    ledger: Vec<DiscountLedgerEntry>,
}

impl<'a> DiscountApplier<'a> {
    pub fn new(cart: &'a Cart, total: Money) -> Self {
        Self::with_base(cart, total, total)
    }

    /// Starts the running total from an explicit base instead of `total`.
    pub fn with_base(cart: &'a Cart, total: Money, base: Money) -> Self {
        Self {
            cart,
            total,
            reduced_total: base,
            ledger: Vec::new(),
        }
    }

    /// Applies a single discount, mutating the running total and recording
    /// a ledger entry when it takes effect.
    pub fn apply(&mut self, discount: &Discount) -> ApplyOutcome {
        if !discount.is_eligible(self.cart, self.reduced_total) {
            return ApplyOutcome::Skipped;
        }

        let currency = &self.cart.currency;
        let scope = self.discountable_lines(discount);

        let savings = match discount.discount_type {
            DiscountType::AlternatePrice => {
                let alternate = discount.alternate_price(currency).to_minor();
                let new_total = match &scope {
                    // Whole cart: the alternate price becomes the total.
                    None => alternate,
                    Some(lines) => lines.len() as i64 * alternate,
                };
                let savings = self.total.to_minor() - new_total;
                self.reduced_total = Money::from_minor(new_total);
                savings
            }
            DiscountType::Shipping => {
                // Always scopes to the shipping charge. A later shipping
                // discount overwrites this one rather than stacking.
                let price = discount.shipping_price(currency).to_minor();
                let original = self
                    .cart
                    .shipping_method
                    .as_ref()
                    .map_or(0, |m| m.price.to_minor());
                self.reduced_total = Money::from_minor(price);
                original - price
            }
            DiscountType::FixedAmount => {
                let savings = discount.amount(currency).to_minor();
                self.reduced_total = Money::from_minor(self.reduced_total.to_minor() - savings);
                savings
            }
            DiscountType::Rate => {
                // Computed against the original total: successive rate
                // discounts are additive on the base, not compounding.
                let rate = discount.rate.unwrap_or(0.0);
                let savings = (self.total.to_minor() as f64 * rate / 100.0).round() as i64;
                self.reduced_total = Money::from_minor(self.reduced_total.to_minor() - savings);
                savings
            }
        };

        self.ledger.push(DiscountLedgerEntry {
            discount_id: discount.id,
            discount_name: discount.name.clone(),
            savings: -savings,
            savings_formatted: Money::from_minor(-savings).format(currency),
        });

        ApplyOutcome::Applied
    }

    /// Applies discounts in order, halting the batch the first time one
    /// signals that it fixes the final amount.
    pub fn apply_many(&mut self, discounts: &[Discount]) -> &[DiscountLedgerEntry] {
        for discount in discounts {
            if self.apply(discount) == ApplyOutcome::AppliedAndTerminal {
                break;
            }
        }

        &self.ledger
    }

    /// Current running total; valid mid-batch.
    pub fn reduced_total(&self) -> Money {
        self.reduced_total
    }

    pub fn ledger(&self) -> &[DiscountLedgerEntry] {
        &self.ledger
    }

    pub fn into_ledger(self) -> Vec<DiscountLedgerEntry> {
        self.ledger
    }

    /// Cart lines the discount applies to. `None` means the whole cart.
    fn discountable_lines(&self, discount: &Discount) -> Option<Vec<&'a CartLine>> {
        match discount.trigger {
            DiscountTrigger::Product => Some(
                self.cart
                    .lines
                    .iter()
                    .filter(|line| Some(line.product_id) == discount.product_id)
                    .collect(),
            ),
            DiscountTrigger::Category => Some(
                self.cart
                    .lines
                    .iter()
                    .filter(|line| {
                        discount
                            .category_id
                            .is_some_and(|id| line.category_ids.contains(&id))
                    })
                    .collect(),
            ),
            DiscountTrigger::Total | DiscountTrigger::Code => None,
        }
    }
}
