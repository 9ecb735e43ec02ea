use crate::domain::errors::CheckoutResult;
use crate::ports::payment_log_port::PaymentLogPort;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// MySQL append-only payment log.
#[derive(Clone)]
pub struct MySqlPaymentLog {
    pool: Arc<Pool<MySql>>,
}

impl MySqlPaymentLog {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }

    async fn insert(
        &self,
        order_id: Uuid,
        successful: bool,
        payload: &serde_json::Value,
        message: Option<&str>,
    ) -> CheckoutResult<Uuid> {
        let id = Uuid::new_v4();
        let query = r#"
            INSERT INTO payment_logs (id, order_id, successful, payload, message, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(id)
            .bind(order_id)
            .bind(successful)
            .bind(Json(payload))
            .bind(message)
            .bind(Utc::now())
            .execute(self.pool.as_ref())
            .await?;

        debug!(
            "Payment log entry written: {} (successful={})",
            id, successful
        );
        Ok(id)
    }
}

#[async_trait]
impl PaymentLogPort for MySqlPaymentLog {
    async fn log_successful(
        &self,
        order_id: Uuid,
        payload: &serde_json::Value,
    ) -> CheckoutResult<Uuid> {
        self.insert(order_id, true, payload, None).await
    }

    async fn log_failed(
        &self,
        order_id: Uuid,
        payload: &serde_json::Value,
        message: &str,
    ) -> CheckoutResult<Uuid> {
        self.insert(order_id, false, payload, Some(message)).await
    }
}
