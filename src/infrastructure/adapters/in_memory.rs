use crate::domain::entities::{Cart, Customer, Order, PaymentProfile};
use crate::domain::errors::{CheckoutError, CheckoutResult};
use crate::ports::cart_store_port::CartStorePort;
use crate::ports::order_repository_port::OrderRepositoryPort;
use crate::ports::payment_log_port::{PaymentLogEntry, PaymentLogPort};
use crate::ports::profile_store_port::ProfileStorePort;
use crate::ports::session_store_port::{PendingAttempt, SessionStorePort};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory session slots. This is the production session store: staged
/// input and pending attempts live per-process, like server-side session
/// state. `take` removes on read, which is what makes the correlation
/// token single-use.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    staged_input: Arc<RwLock<HashMap<String, String>>>,
    pending: Arc<RwLock<HashMap<String, PendingAttempt>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorePort for InMemorySessionStore {
    async fn put_staged_input(&self, session_id: &str, ciphertext: String) -> CheckoutResult<()> {
        self.staged_input
            .write()
            .await
            .insert(session_id.to_string(), ciphertext);
        Ok(())
    }

    async fn take_staged_input(&self, session_id: &str) -> CheckoutResult<Option<String>> {
        Ok(self.staged_input.write().await.remove(session_id))
    }

    async fn put_pending_attempt(
        &self,
        session_id: &str,
        attempt: PendingAttempt,
    ) -> CheckoutResult<()> {
        self.pending
            .write()
            .await
            .insert(session_id.to_string(), attempt);
        Ok(())
    }

    async fn take_pending_attempt(
        &self,
        session_id: &str,
    ) -> CheckoutResult<Option<PendingAttempt>> {
        Ok(self.pending.write().await.remove(session_id))
    }
}

/// In-memory order store, for tests.
#[derive(Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepositoryPort for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> CheckoutResult<()> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> CheckoutResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn update(&self, order: &Order) -> CheckoutResult<()> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.id) {
            return Err(CheckoutError::OrderNotFound(order.id.to_string()));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }
}

/// In-memory cart store, for tests.
#[derive(Default, Clone)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, cart: Cart) {
        self.carts.write().await.insert(cart.id, cart);
    }
}

#[async_trait]
impl CartStorePort for InMemoryCartStore {
    async fn find_by_id(&self, id: Uuid) -> CheckoutResult<Option<Cart>> {
        Ok(self.carts.read().await.get(&id).cloned())
    }
}

/// In-memory customer/profile store, for tests. Enforces the
/// single-primary-per-customer invariant the same way the MySQL store does.
#[derive(Default, Clone)]
pub struct InMemoryProfileStore {
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
    profiles: Arc<RwLock<HashMap<Uuid, PaymentProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_customer(&self, customer: Customer) {
        self.customers.write().await.insert(customer.id, customer);
    }
}

#[async_trait]
impl ProfileStorePort for InMemoryProfileStore {
    async fn find_customer(&self, customer_id: Uuid) -> CheckoutResult<Option<Customer>> {
        Ok(self.customers.read().await.get(&customer_id).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> CheckoutResult<Option<PaymentProfile>> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn find_by_customer(&self, customer_id: Uuid) -> CheckoutResult<Vec<PaymentProfile>> {
        let profiles = self.profiles.read().await;
        let mut result: Vec<PaymentProfile> = profiles
            .values()
            .filter(|p| p.customer_id == customer_id)
            .cloned()
            .collect();
        result.sort_by_key(|p| p.created_at);
        Ok(result)
    }

    async fn find_for_vendor(
        &self,
        customer_id: Uuid,
        vendor_id: &str,
    ) -> CheckoutResult<Option<PaymentProfile>> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|p| p.customer_id == customer_id && p.vendor_id == vendor_id)
            .cloned())
    }

    async fn save(&self, profile: &PaymentProfile) -> CheckoutResult<()> {
        self.profiles
            .write()
            .await
            .insert(profile.id, profile.clone());
        Ok(())
    }

    async fn update(&self, profile: &PaymentProfile) -> CheckoutResult<()> {
        let mut profiles = self.profiles.write().await;
        if !profiles.contains_key(&profile.id) {
            return Err(CheckoutError::ProfileNotFound(profile.id.to_string()));
        }
        profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CheckoutResult<()> {
        if self.profiles.write().await.remove(&id).is_none() {
            return Err(CheckoutError::ProfileNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn make_primary(&self, id: Uuid, customer_id: Uuid) -> CheckoutResult<()> {
        let mut profiles = self.profiles.write().await;
        for profile in profiles.values_mut() {
            if profile.customer_id == customer_id {
                profile.is_primary = profile.id == id;
            }
        }
        Ok(())
    }
}

/// In-memory payment log, for tests. Keeps entries inspectable.
#[derive(Default, Clone)]
pub struct InMemoryPaymentLog {
    entries: Arc<RwLock<Vec<PaymentLogEntry>>>,
}

impl InMemoryPaymentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<PaymentLogEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl PaymentLogPort for InMemoryPaymentLog {
    async fn log_successful(
        &self,
        order_id: Uuid,
        payload: &serde_json::Value,
    ) -> CheckoutResult<Uuid> {
        let id = Uuid::new_v4();
        self.entries.write().await.push(PaymentLogEntry {
            id,
            order_id,
            successful: true,
            payload: payload.clone(),
            message: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn log_failed(
        &self,
        order_id: Uuid,
        payload: &serde_json::Value,
        message: &str,
    ) -> CheckoutResult<Uuid> {
        let id = Uuid::new_v4();
        self.entries.write().await.push(PaymentLogEntry {
            id,
            order_id,
            successful: false,
            payload: payload.clone(),
            message: Some(message.to_string()),
            created_at: Utc::now(),
        });
        Ok(id)
    }
}
