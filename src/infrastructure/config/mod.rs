pub mod checkout_config;
pub mod gateway_config;

pub use checkout_config::CheckoutConfig;
pub use gateway_config::GatewayConfig;
