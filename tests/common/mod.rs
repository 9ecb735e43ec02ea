use async_trait::async_trait;
use checkout_rs::application::{CheckoutService, ProfileService};
use checkout_rs::domain::discount::Discount;
use checkout_rs::domain::entities::{
    Cart, CartLine, Customer, Order, PaymentMethod, PaymentProfile, ShippingMethod,
};
use checkout_rs::domain::errors::{CheckoutError, CheckoutResult};
use checkout_rs::domain::value_objects::{CardData, Money, PaymentResult};
use checkout_rs::infrastructure::adapters::{
    InMemoryCartStore, InMemoryOrderRepository, InMemoryPaymentLog, InMemoryProfileStore,
    InMemorySessionStore,
};
use checkout_rs::infrastructure::config::GatewayConfig;
use checkout_rs::infrastructure::crypto::SecretSealer;
use checkout_rs::infrastructure::providers::CardProvider;
use checkout_rs::ports::gateway_port::{GatewayResponse, PurchaseRequest};
use checkout_rs::ports::{
    GatewayTransport, OrderRepositoryPort, PaymentProvider, ProviderRegistry,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One scripted gateway reply: a response or a transport fault.
pub enum Reply {
    Ok(GatewayResponse),
    Fault(&'static str),
}

impl Reply {
    fn take(self) -> CheckoutResult<GatewayResponse> {
        match self {
            Reply::Ok(response) => Ok(response),
            Reply::Fault(message) => Err(CheckoutError::GatewayFault(message.to_string())),
        }
    }
}

pub fn approved(id: &str) -> GatewayResponse {
    GatewayResponse {
        successful: true,
        data: json!({ "id": id }),
    }
}

pub fn declined(message: &str) -> GatewayResponse {
    GatewayResponse {
        successful: false,
        data: json!({ "error": { "message": message } }),
    }
}

pub fn redirecting(url: &str) -> GatewayResponse {
    GatewayResponse {
        successful: false,
        data: json!({ "redirect_url": url }),
    }
}

/// Scripted gateway transport. Each endpoint pops replies in order and
/// panics on an unscripted call; purchase requests are recorded for
/// assertions.
#[derive(Default)]
pub struct MockGateway {
    purchase: Mutex<VecDeque<Reply>>,
    create_customer: Mutex<VecDeque<Reply>>,
    fetch_customer: Mutex<VecDeque<Reply>>,
    create_card: Mutex<VecDeque<Reply>>,
    update_card: Mutex<VecDeque<Reply>>,
    delete_customer: Mutex<VecDeque<Reply>>,
    purchases_seen: Mutex<Vec<PurchaseRequest>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn script_purchase(&self, reply: Reply) {
        self.purchase.lock().await.push_back(reply);
    }

    pub async fn script_create_customer(&self, reply: Reply) {
        self.create_customer.lock().await.push_back(reply);
    }

    pub async fn script_fetch_customer(&self, reply: Reply) {
        self.fetch_customer.lock().await.push_back(reply);
    }

    pub async fn script_create_card(&self, reply: Reply) {
        self.create_card.lock().await.push_back(reply);
    }

    pub async fn script_update_card(&self, reply: Reply) {
        self.update_card.lock().await.push_back(reply);
    }

    pub async fn script_delete_customer(&self, reply: Reply) {
        self.delete_customer.lock().await.push_back(reply);
    }

    pub async fn purchases_seen(&self) -> Vec<PurchaseRequest> {
        self.purchases_seen.lock().await.clone()
    }

    async fn next(queue: &Mutex<VecDeque<Reply>>, endpoint: &str) -> CheckoutResult<GatewayResponse> {
        queue
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted gateway call: {endpoint}"))
            .take()
    }
}

#[async_trait]
impl GatewayTransport for MockGateway {
    async fn purchase(&self, request: PurchaseRequest) -> CheckoutResult<GatewayResponse> {
        self.purchases_seen.lock().await.push(request);
        Self::next(&self.purchase, "purchase").await
    }

    async fn create_customer(
        &self,
        _description: &str,
        _email: &str,
    ) -> CheckoutResult<GatewayResponse> {
        Self::next(&self.create_customer, "create_customer").await
    }

    async fn fetch_customer(&self, _customer_token: &str) -> CheckoutResult<GatewayResponse> {
        Self::next(&self.fetch_customer, "fetch_customer").await
    }

    async fn create_card(
        &self,
        _customer_token: &str,
        _card: &CardData,
    ) -> CheckoutResult<GatewayResponse> {
        Self::next(&self.create_card, "create_card").await
    }

    async fn update_card(
        &self,
        _customer_token: &str,
        _card_token: &str,
        _card: &CardData,
    ) -> CheckoutResult<GatewayResponse> {
        Self::next(&self.update_card, "update_card").await
    }

    async fn delete_customer(&self, _customer_token: &str) -> CheckoutResult<GatewayResponse> {
        Self::next(&self.delete_customer, "delete_customer").await
    }
}

/// Fully wired checkout stack over in-memory adapters and the scripted
/// gateway.
pub struct TestApp {
    pub checkout: CheckoutService,
    pub profile_service: ProfileService,
    pub provider: Arc<CardProvider>,
    pub gateway: Arc<MockGateway>,
    pub carts: Arc<InMemoryCartStore>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub profiles: Arc<InMemoryProfileStore>,
    pub payment_log: Arc<InMemoryPaymentLog>,
    pub sessions: Arc<InMemorySessionStore>,
    pub sealer: SecretSealer,
}

pub fn test_gateway_config() -> Arc<GatewayConfig> {
    Arc::new(GatewayConfig {
        api_key: "sk_test".to_string(),
        base_url: "https://gateway.test".to_string(),
        timeout_secs: 5,
        return_url: "https://shop.test/api/checkout/return".to_string(),
        cancel_url: "https://shop.test/cancelled".to_string(),
    })
}

pub fn test_app() -> TestApp {
    test_app_with(|_, _| {})
}

/// Like `test_app`, but lets the test register additional providers before
/// the services are wired.
pub fn test_app_with(
    extra: impl FnOnce(Arc<InMemoryOrderRepository>, &mut ProviderRegistry),
) -> TestApp {
    let gateway = MockGateway::new();
    let carts = Arc::new(InMemoryCartStore::new());
    let orders = Arc::new(InMemoryOrderRepository::new());
    let profiles = Arc::new(InMemoryProfileStore::new());
    let payment_log = Arc::new(InMemoryPaymentLog::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let sealer = SecretSealer::new([7u8; 32]);

    let provider = Arc::new(CardProvider::new(
        gateway.clone(),
        orders.clone(),
        payment_log.clone(),
        profiles.clone(),
        test_gateway_config(),
    ));

    let mut providers = ProviderRegistry::new();
    providers.register(provider.clone());
    extra(orders.clone(), &mut providers);

    let checkout = CheckoutService::new(
        carts.clone(),
        orders.clone(),
        profiles.clone(),
        sessions.clone(),
        providers.clone(),
        sealer.clone(),
    );
    let profile_service = ProfileService::new(profiles.clone(), providers);

    TestApp {
        checkout,
        profile_service,
        provider,
        gateway,
        carts,
        orders,
        profiles,
        payment_log,
        sessions,
        sealer,
    }
}

/// Cart with one 85.00 line, 10.00 shipping and the card provider selected.
pub fn checkout_ready_cart(customer_id: Uuid) -> Cart {
    let mut cart = Cart::empty(customer_id, "USD");
    cart.lines.push(CartLine {
        product_id: Uuid::new_v4(),
        category_ids: vec![],
        quantity: 1,
        unit_price: Money::from_minor(8500),
    });
    cart.shipping_method = Some(ShippingMethod {
        id: Uuid::new_v4(),
        name: "Standard".to_string(),
        price: Money::from_minor(1000),
    });
    cart.payment_method = Some(PaymentMethod {
        id: Uuid::new_v4(),
        name: "Credit card".to_string(),
        provider: "card".to_string(),
    });
    cart
}

pub fn cart_with_discounts(customer_id: Uuid, discounts: Vec<Discount>) -> Cart {
    let mut cart = checkout_ready_cart(customer_id);
    cart.discounts = discounts;
    cart
}

pub fn test_customer() -> Customer {
    Customer {
        id: Uuid::new_v4(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.test".to_string(),
    }
}

pub fn valid_card() -> CardData {
    CardData {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        number: "4242424242424242".to_string(),
        expiry_month: 12,
        expiry_year: 2030,
        cvv: "123".to_string(),
    }
}

/// Provider that always sends the customer off-site and settles the order
/// in an explicit completion step on return.
pub struct BankTransferProvider {
    orders: Arc<dyn OrderRepositoryPort>,
}

impl BankTransferProvider {
    pub fn new(orders: Arc<dyn OrderRepositoryPort>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl PaymentProvider for BankTransferProvider {
    fn name(&self) -> &str {
        "Bank transfer"
    }

    fn identifier(&self) -> &str {
        "bank_transfer"
    }

    fn validate(&self, _card: &CardData) -> CheckoutResult<()> {
        Ok(())
    }

    async fn process(
        &self,
        order: &mut Order,
        _card: &CardData,
    ) -> CheckoutResult<PaymentResult> {
        Ok(PaymentResult {
            successful: false,
            redirect_url: Some("https://bank.test/authorize".to_string()),
            order_id: Some(order.id),
            ..PaymentResult::default()
        })
    }

    fn requires_offsite_completion(&self) -> bool {
        true
    }

    async fn complete(&self, order: &mut Order) -> CheckoutResult<PaymentResult> {
        order.record_successful_payment(
            Uuid::new_v4(),
            json!({ "reference": "tx_1" }),
            None,
            None,
            None,
        )?;
        self.orders.update(order).await?;

        Ok(PaymentResult {
            successful: true,
            payment_id: order.payment_id,
            order_id: Some(order.id),
            ..PaymentResult::default()
        })
    }

    fn supports_payment_profiles(&self) -> bool {
        false
    }

    async fn update_payment_profile(
        &self,
        _customer: &Customer,
        _card: &CardData,
    ) -> CheckoutResult<PaymentProfile> {
        Err(CheckoutError::Configuration(
            "bank_transfer does not store payment profiles".to_string(),
        ))
    }

    async fn delete_payment_profile(&self, _profile: &PaymentProfile) -> CheckoutResult<()> {
        Err(CheckoutError::Configuration(
            "bank_transfer does not store payment profiles".to_string(),
        ))
    }

    async fn pay_from_profile(
        &self,
        _order: &mut Order,
        _profile: &PaymentProfile,
    ) -> CheckoutResult<PaymentResult> {
        Err(CheckoutError::Configuration(
            "bank_transfer does not store payment profiles".to_string(),
        ))
    }
}

/// Provider that registers itself for off-site completion but keeps the
/// default `complete`, so the return leg must fail fast.
pub struct WireProvider;

#[async_trait]
impl PaymentProvider for WireProvider {
    fn name(&self) -> &str {
        "Wire"
    }

    fn identifier(&self) -> &str {
        "wire"
    }

    fn validate(&self, _card: &CardData) -> CheckoutResult<()> {
        Ok(())
    }

    async fn process(
        &self,
        order: &mut Order,
        _card: &CardData,
    ) -> CheckoutResult<PaymentResult> {
        Ok(PaymentResult {
            successful: false,
            redirect_url: Some("https://wire.test/authorize".to_string()),
            order_id: Some(order.id),
            ..PaymentResult::default()
        })
    }

    fn requires_offsite_completion(&self) -> bool {
        true
    }

    fn supports_payment_profiles(&self) -> bool {
        false
    }

    async fn update_payment_profile(
        &self,
        _customer: &Customer,
        _card: &CardData,
    ) -> CheckoutResult<PaymentProfile> {
        Err(CheckoutError::Configuration(
            "wire does not store payment profiles".to_string(),
        ))
    }

    async fn delete_payment_profile(&self, _profile: &PaymentProfile) -> CheckoutResult<()> {
        Err(CheckoutError::Configuration(
            "wire does not store payment profiles".to_string(),
        ))
    }

    async fn pay_from_profile(
        &self,
        _order: &mut Order,
        _profile: &PaymentProfile,
    ) -> CheckoutResult<PaymentResult> {
        Err(CheckoutError::Configuration(
            "wire does not store payment profiles".to_string(),
        ))
    }
}
