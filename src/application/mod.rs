pub mod checkout_service;
pub mod dto;
pub mod profile_service;

pub use checkout_service::CheckoutService;
pub use dto::*;
pub use profile_service::ProfileService;
