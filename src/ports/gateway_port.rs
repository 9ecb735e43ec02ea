use crate::domain::errors::CheckoutResult;
use crate::domain::value_objects::CardData;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Funding source for a purchase: raw card input or stored profile tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PurchaseSource {
    Card(CardData),
    Profile {
        customer_token: String,
        card_token: String,
    },
}

/// Purchase request handed to the gateway transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub source: PurchaseSource,
    pub return_url: String,
    pub cancel_url: String,
}

/// Raw gateway response: a success flag plus an opaque data payload.
/// A gateway-reported decline arrives here with `successful = false`;
/// transport-level faults never produce a response at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub successful: bool,
    pub data: serde_json::Value,
}

impl GatewayResponse {
    /// Primary reference of the created resource, when present.
    pub fn reference(&self) -> Option<&str> {
        self.data["id"].as_str()
    }

    /// Redirect target for off-site completion flows, when present.
    pub fn redirect_url(&self) -> Option<&str> {
        self.data["redirect_url"].as_str()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.data["error"]["message"].as_str()
    }
}

/// Network boundary to the card processor. Every call blocks with a bounded
/// timeout; an `Err` is a transport fault, catchable at the provider
/// boundary and convertible to a failed result.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn purchase(&self, request: PurchaseRequest) -> CheckoutResult<GatewayResponse>;

    async fn create_customer(
        &self,
        description: &str,
        email: &str,
    ) -> CheckoutResult<GatewayResponse>;

    async fn fetch_customer(&self, customer_token: &str) -> CheckoutResult<GatewayResponse>;

    async fn create_card(
        &self,
        customer_token: &str,
        card: &CardData,
    ) -> CheckoutResult<GatewayResponse>;

    async fn update_card(
        &self,
        customer_token: &str,
        card_token: &str,
        card: &CardData,
    ) -> CheckoutResult<GatewayResponse>;

    async fn delete_customer(&self, customer_token: &str) -> CheckoutResult<GatewayResponse>;
}
