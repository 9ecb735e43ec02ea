use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment state of an order. Transitions are one-way out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Awaiting settlement
    Pending,
    /// Settled successfully
    Paid,
    /// Settlement failed
    Failed,
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentState::Pending => write!(f, "pending"),
            PaymentState::Paid => write!(f, "paid"),
            PaymentState::Failed => write!(f, "failed"),
        }
    }
}

/// Monetary value in integer minor units (avoids float precision issues).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (cents)
    pub minor_units: i64,
}

impl Money {
    /// Amount in major units (e.g. whole dollars)
    pub fn from_major(amount: i64) -> Self {
        Self {
            minor_units: amount * 100,
        }
    }

    /// Amount in minor units (e.g. cents)
    pub fn from_minor(minor_units: i64) -> Self {
        Self { minor_units }
    }

    pub fn zero() -> Self {
        Self { minor_units: 0 }
    }

    pub fn to_minor(&self) -> i64 {
        self.minor_units
    }

    /// Formats as a 2-decimal string with the currency code, e.g. `85.00 USD`.
    pub fn format(&self, currency: &str) -> String {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.abs();
        format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, currency)
    }
}

/// Card brand detected from the PAN prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Other,
}

impl CardBrand {
    pub fn from_pan(number: &str) -> Self {
        if number.starts_with('4') {
            CardBrand::Visa
        } else if number.starts_with('5') {
            CardBrand::Mastercard
        } else if number.starts_with("34") || number.starts_with("37") {
            CardBrand::Amex
        } else {
            CardBrand::Other
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardBrand::Visa => write!(f, "visa"),
            CardBrand::Mastercard => write!(f, "mastercard"),
            CardBrand::Amex => write!(f, "amex"),
            CardBrand::Other => write!(f, "other"),
        }
    }
}

/// Raw card input as entered by the customer. Staged encrypted in the
/// session between the payment step and the checkout call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardData {
    pub first_name: String,
    pub last_name: String,
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
}

impl CardData {
    pub fn holder_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn last4(&self) -> String {
        let len = self.number.len();
        self.number
            .get(len.saturating_sub(4)..)
            .unwrap_or("")
            .to_string()
    }

    pub fn brand(&self) -> CardBrand {
        CardBrand::from_pan(&self.number)
    }

    pub fn is_empty(&self) -> bool {
        self.number.is_empty()
    }
}

/// Terminal value returned by every provider operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentResult {
    /// Whether the settlement succeeded
    pub successful: bool,

    /// Off-site redirect target; presence means the outcome is not final yet
    pub redirect_url: Option<String>,

    /// Logged successful payment record
    pub payment_id: Option<uuid::Uuid>,

    /// Logged failed payment record
    pub failed_payment_id: Option<uuid::Uuid>,

    /// The order this result settles
    pub order_id: Option<uuid::Uuid>,

    /// Human-readable failure message
    pub message: Option<String>,
}

impl PaymentResult {
    pub fn failed(order_id: uuid::Uuid, message: impl Into<String>) -> Self {
        Self {
            successful: false,
            order_id: Some(order_id),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn requires_redirect(&self) -> bool {
        self.redirect_url.is_some()
    }
}
