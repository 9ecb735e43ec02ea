pub mod discount;
pub mod entities;
pub mod errors;
pub mod events;
pub mod value_objects;

pub use discount::{ApplyOutcome, Discount, DiscountApplier, DiscountLedgerEntry};
pub use entities::{Cart, Customer, Order, PaymentProfile};
pub use errors::{CheckoutError, CheckoutResult};
pub use events::*;
pub use value_objects::{CardBrand, CardData, Money, PaymentResult, PaymentState};
