pub mod adapters;
pub mod config;
pub mod crypto;
pub mod providers;

pub use adapters::*;
pub use config::{CheckoutConfig, GatewayConfig};
pub use crypto::SecretSealer;
pub use providers::CardProvider;
