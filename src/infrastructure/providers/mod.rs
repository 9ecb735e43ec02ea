pub mod card_provider;

pub use card_provider::CardProvider;
