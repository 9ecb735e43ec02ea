use crate::domain::discount::Discount;
use crate::domain::entities::{Cart, CartLine, PaymentMethod, ShippingMethod};
use crate::domain::errors::CheckoutResult;
use crate::ports::cart_store_port::CartStorePort;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{MySql, Pool};
use std::sync::Arc;

/// MySQL cart store implementation. Read-only; carts are written by the
/// storefront, not by the checkout core.
#[derive(Clone)]
pub struct MySqlCartStore {
    pool: Arc<Pool<MySql>>,
}

impl MySqlCartStore {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStorePort for MySqlCartStore {
    async fn find_by_id(&self, id: uuid::Uuid) -> CheckoutResult<Option<Cart>> {
        let query = r#"
            SELECT id, customer_id, currency, lines,
                   shipping_method, payment_method, discounts
            FROM carts
            WHERE id = ?
        "#;

        let result = sqlx::query_as::<_, CartRow>(query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(result.map(CartRow::into_cart))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: uuid::Uuid,
    customer_id: uuid::Uuid,
    currency: String,
    lines: Json<Vec<CartLine>>,
    shipping_method: Option<Json<ShippingMethod>>,
    payment_method: Option<Json<PaymentMethod>>,
    discounts: Json<Vec<Discount>>,
}

impl CartRow {
    fn into_cart(self) -> Cart {
        Cart {
            id: self.id,
            customer_id: self.customer_id,
            currency: self.currency,
            lines: self.lines.0,
            shipping_method: self.shipping_method.map(|m| m.0),
            payment_method: self.payment_method.map(|m| m.0),
            discounts: self.discounts.0,
        }
    }
}
