pub mod in_memory;
pub mod mysql_cart_store;
pub mod mysql_order_repository;
pub mod mysql_payment_log;
pub mod mysql_profile_store;
pub mod rest_card_gateway;

pub use in_memory::{
    InMemoryCartStore, InMemoryOrderRepository, InMemoryPaymentLog, InMemoryProfileStore,
    InMemorySessionStore,
};
pub use mysql_cart_store::MySqlCartStore;
pub use mysql_order_repository::MySqlOrderRepository;
pub use mysql_payment_log::MySqlPaymentLog;
pub use mysql_profile_store::MySqlProfileStore;
pub use rest_card_gateway::RestCardGateway;
