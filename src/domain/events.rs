use crate::domain::entities::Order;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain event trait
pub trait DomainEvent {
    fn event_type(&self) -> &'static str;
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Emitted after a settlement attempt succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub order_id: Uuid,
    pub amount: i64,
    pub currency: String,
}

impl DomainEvent for PaymentCompleted {
    fn event_type(&self) -> &'static str {
        "PaymentCompleted"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl PaymentCompleted {
    pub fn from_order(order: &Order) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            order_id: order.id,
            amount: order.total.to_minor(),
            currency: order.currency.clone(),
        }
    }
}

/// Emitted after a settlement attempt fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub order_id: Uuid,
    pub reason: String,
}

impl DomainEvent for PaymentFailed {
    fn event_type(&self) -> &'static str {
        "PaymentFailed"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl PaymentFailed {
    pub fn new(order_id: Uuid, reason: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            order_id,
            reason,
        }
    }
}
