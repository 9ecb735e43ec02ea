use crate::domain::errors::CheckoutResult;
use crate::domain::value_objects::CardData;
use crate::infrastructure::config::GatewayConfig;
use crate::ports::gateway_port::{GatewayResponse, GatewayTransport, PurchaseRequest, PurchaseSource};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Card gateway adapter over the processor's REST API.
///
/// Error mapping: transport failures (connect, timeout, unreadable body)
/// surface as `Err(GatewayFault)`; an HTTP error status with a parseable
/// body is a gateway-reported decline and comes back as a response with
/// `successful = false`.
#[derive(Clone)]
pub struct RestCardGateway {
    config: Arc<GatewayConfig>,
    client: Client,
}

impl RestCardGateway {
    pub fn new(config: Arc<GatewayConfig>) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> CheckoutResult<GatewayResponse> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("Gateway request: {} {}", method, path);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let successful = response.status().is_success();
        let data: serde_json::Value = response.json().await?;

        debug!("Gateway response (successful={}): {}", successful, data);

        Ok(GatewayResponse { successful, data })
    }

    fn card_payload(card: &CardData) -> serde_json::Value {
        json!({
            "number": card.number,
            "exp_month": card.expiry_month,
            "exp_year": card.expiry_year,
            "cvc": card.cvv,
            "name": card.holder_name(),
        })
    }
}

#[async_trait]
impl GatewayTransport for RestCardGateway {
    async fn purchase(&self, request: PurchaseRequest) -> CheckoutResult<GatewayResponse> {
        let source = match &request.source {
            PurchaseSource::Card(card) => json!({ "card": Self::card_payload(card) }),
            PurchaseSource::Profile {
                customer_token,
                card_token,
            } => json!({
                "customer": customer_token,
                "card": card_token,
            }),
        };

        let body = json!({
            "amount": request.amount_minor,
            "currency": request.currency,
            "source": source,
            "return_url": request.return_url,
            "cancel_url": request.cancel_url,
        });

        self.request(Method::POST, "/v1/charges", Some(body)).await
    }

    async fn create_customer(
        &self,
        description: &str,
        email: &str,
    ) -> CheckoutResult<GatewayResponse> {
        let body = json!({
            "description": description,
            "email": email,
        });

        self.request(Method::POST, "/v1/customers", Some(body)).await
    }

    async fn fetch_customer(&self, customer_token: &str) -> CheckoutResult<GatewayResponse> {
        self.request(Method::GET, &format!("/v1/customers/{customer_token}"), None)
            .await
    }

    async fn create_card(
        &self,
        customer_token: &str,
        card: &CardData,
    ) -> CheckoutResult<GatewayResponse> {
        let body = json!({ "card": Self::card_payload(card) });

        self.request(
            Method::POST,
            &format!("/v1/customers/{customer_token}/cards"),
            Some(body),
        )
        .await
    }

    async fn update_card(
        &self,
        customer_token: &str,
        card_token: &str,
        card: &CardData,
    ) -> CheckoutResult<GatewayResponse> {
        let body = json!({ "card": Self::card_payload(card) });

        self.request(
            Method::POST,
            &format!("/v1/customers/{customer_token}/cards/{card_token}"),
            Some(body),
        )
        .await
    }

    async fn delete_customer(&self, customer_token: &str) -> CheckoutResult<GatewayResponse> {
        self.request(
            Method::DELETE,
            &format!("/v1/customers/{customer_token}"),
            None,
        )
        .await
    }
}
