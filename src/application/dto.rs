use crate::domain::entities::PaymentProfile;
use crate::domain::value_objects::CardData;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stages raw card input for the next checkout call.
#[derive(Debug, Deserialize)]
pub struct StagePaymentInputRequest {
    /// Session the input is staged under
    pub session_id: String,

    /// Provider that will validate and later charge the card
    pub provider: String,

    pub card: CardData,
}

/// Settles a cart into a paid order.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub session_id: String,
    pub cart_id: Uuid,
}

/// Off-site return call from the gateway round trip.
#[derive(Debug, Deserialize)]
pub struct OffsiteReturnRequest {
    pub session_id: String,

    /// `cancel` short-circuits to the cancelled outcome
    #[serde(rename = "type")]
    pub return_type: Option<String>,

    /// Correlation token issued when the attempt went off-site
    pub token: Option<String>,
}

/// Terminal routing of a settlement attempt. The three final outcomes each
/// have their own destination; a redirect is an intermediate stop at the
/// gateway's page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Redirect {
        url: String,
        /// Correlation token the gateway round trip must hand back on
        /// return. Single use.
        token: String,
    },
    Success { order_id: Uuid },
    Failed { order_id: Option<Uuid> },
    Cancelled { order_id: Option<Uuid> },
}

/// Creates or refreshes a customer's tokenized profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub customer_id: Uuid,
    pub provider: String,
    pub card: CardData,
}

/// Profile view returned to clients. Gateway tokens never leave the core.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub vendor_id: String,
    pub card_brand: Option<String>,
    pub card_last4: String,
    pub card_expiry_month: Option<u32>,
    pub card_expiry_year: Option<i32>,
    pub is_primary: bool,
}

impl From<&PaymentProfile> for ProfileResponse {
    fn from(profile: &PaymentProfile) -> Self {
        Self {
            id: profile.id,
            vendor_id: profile.vendor_id.clone(),
            card_brand: profile.card_brand.map(|b| b.to_string()),
            card_last4: profile.card_last4.clone(),
            card_expiry_month: profile.card_expiry_month,
            card_expiry_year: profile.card_expiry_year,
            is_primary: profile.is_primary,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: String, message: String) -> Self {
        Self { error, message }
    }
}
