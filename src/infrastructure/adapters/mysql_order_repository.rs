use crate::domain::discount::DiscountLedgerEntry;
use crate::domain::entities::Order;
use crate::domain::errors::{CheckoutError, CheckoutResult};
use crate::domain::value_objects::{CardBrand, Money, PaymentState};
use crate::ports::order_repository_port::OrderRepositoryPort;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::{debug, error};

/// MySQL order store implementation
#[derive(Clone)]
pub struct MySqlOrderRepository {
    pool: Arc<Pool<MySql>>,
}

impl MySqlOrderRepository {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepositoryPort for MySqlOrderRepository {
    async fn save(&self, order: &Order) -> CheckoutResult<()> {
        let query = r#"
            INSERT INTO orders (
                id, cart_id, customer_id, currency,
                items_total, shipping_total, total, discount_ledger,
                payment_provider, payment_id, payment_data,
                card_brand, card_holder_name, card_last4,
                payment_state, created_at, updated_at, paid_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(order.id)
            .bind(order.cart_id)
            .bind(order.customer_id)
            .bind(&order.currency)
            .bind(order.items_total.to_minor())
            .bind(order.shipping_total.to_minor())
            .bind(order.total.to_minor())
            .bind(Json(&order.discount_ledger))
            .bind(&order.payment_provider)
            .bind(order.payment_id)
            .bind(order.payment_data.as_ref().map(Json))
            .bind(order.card_brand.map(|b| b.to_string()))
            .bind(&order.card_holder_name)
            .bind(&order.card_last4)
            .bind(order.payment_state.to_string())
            .bind(order.created_at)
            .bind(order.updated_at)
            .bind(order.paid_at)
            .execute(self.pool.as_ref())
            .await?;

        debug!("Order saved: {}", order.id);
        Ok(())
    }

    async fn find_by_id(&self, id: uuid::Uuid) -> CheckoutResult<Option<Order>> {
        let query = r#"
            SELECT id, cart_id, customer_id, currency,
                   items_total, shipping_total, total, discount_ledger,
                   payment_provider, payment_id, payment_data,
                   card_brand, card_holder_name, card_last4,
                   payment_state, created_at, updated_at, paid_at
            FROM orders
            WHERE id = ?
        "#;

        let result = sqlx::query_as::<_, OrderRow>(query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        result.map(OrderRow::into_order).transpose()
    }

    async fn update(&self, order: &Order) -> CheckoutResult<()> {
        let query = r#"
            UPDATE orders
            SET payment_id = ?, payment_data = ?, card_brand = ?,
                card_holder_name = ?, card_last4 = ?, payment_state = ?,
                updated_at = ?, paid_at = ?
            WHERE id = ?
        "#;

        let rows_affected = sqlx::query(query)
            .bind(order.payment_id)
            .bind(order.payment_data.as_ref().map(Json))
            .bind(order.card_brand.map(|b| b.to_string()))
            .bind(&order.card_holder_name)
            .bind(&order.card_last4)
            .bind(order.payment_state.to_string())
            .bind(order.updated_at)
            .bind(order.paid_at)
            .bind(order.id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            error!("No order found to update: {}", order.id);
            return Err(CheckoutError::OrderNotFound(order.id.to_string()));
        }

        debug!("Order updated: {}", order.id);
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: uuid::Uuid,
    cart_id: uuid::Uuid,
    customer_id: uuid::Uuid,
    currency: String,
    items_total: i64,
    shipping_total: i64,
    total: i64,
    discount_ledger: Json<Vec<DiscountLedgerEntry>>,
    payment_provider: String,
    payment_id: Option<uuid::Uuid>,
    payment_data: Option<Json<serde_json::Value>>,
    card_brand: Option<String>,
    card_holder_name: Option<String>,
    card_last4: Option<String>,
    payment_state: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    paid_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl OrderRow {
    fn into_order(self) -> CheckoutResult<Order> {
        let payment_state = parse_payment_state(&self.payment_state)?;
        let card_brand = self.card_brand.as_deref().map(parse_card_brand);

        Ok(Order {
            id: self.id,
            cart_id: self.cart_id,
            customer_id: self.customer_id,
            currency: self.currency,
            items_total: Money::from_minor(self.items_total),
            shipping_total: Money::from_minor(self.shipping_total),
            total: Money::from_minor(self.total),
            discount_ledger: self.discount_ledger.0,
            payment_provider: self.payment_provider,
            payment_id: self.payment_id,
            payment_data: self.payment_data.map(|d| d.0),
            card_brand,
            card_holder_name: self.card_holder_name,
            card_last4: self.card_last4,
            payment_state,
            created_at: self.created_at,
            updated_at: self.updated_at,
            paid_at: self.paid_at,
        })
    }
}

fn parse_payment_state(value: &str) -> CheckoutResult<PaymentState> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(Into::into)
}

fn parse_card_brand(value: &str) -> CardBrand {
    match value {
        "visa" => CardBrand::Visa,
        "mastercard" => CardBrand::Mastercard,
        "amex" => CardBrand::Amex,
        _ => CardBrand::Other,
    }
}
