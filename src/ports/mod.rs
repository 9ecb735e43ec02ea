pub mod cart_store_port;
pub mod gateway_port;
pub mod order_repository_port;
pub mod payment_log_port;
pub mod payment_provider;
pub mod profile_store_port;
pub mod session_store_port;

pub use cart_store_port::CartStorePort;
pub use gateway_port::GatewayTransport;
pub use order_repository_port::OrderRepositoryPort;
pub use payment_log_port::PaymentLogPort;
pub use payment_provider::{PaymentProvider, ProviderRegistry};
pub use profile_store_port::ProfileStorePort;
pub use session_store_port::SessionStorePort;
