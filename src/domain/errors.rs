use thiserror::Error;

/// Domain error taxonomy for the checkout core.
///
/// `GatewayFault` covers transport-level failures (timeouts, connection
/// errors, malformed responses) and is always caught at the provider
/// boundary. `GatewayRejection` is the gateway explicitly declining an
/// operation; it is fatal for profile management but degraded to a failed
/// `PaymentResult` during settlement. `Integrity` errors abort an attempt
/// before any order mutation.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Malformed payment input, surfaced before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Broken precondition: missing method selection, missing profile
    /// tokens, correlation token mismatch, missing completion capability
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// The gateway explicitly declined the operation
    #[error("Gateway rejected the operation: {0}")]
    GatewayRejection(String),

    /// Transport-level gateway failure
    #[error("Gateway transport fault: {0}")]
    GatewayFault(String),

    /// Illegal payment state transition
    #[error("Invalid payment state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Cart not found
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Payment profile not found
    #[error("Payment profile not found: {0}")]
    ProfileNotFound(String),

    /// Customer not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Encryption/decryption error
    #[error("Cryptography error: {0}")]
    Crypto(String),

    /// Misconfigured provider or environment
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for CheckoutError {
    fn from(e: reqwest::Error) -> Self {
        CheckoutError::GatewayFault(e.to_string())
    }
}

/// Result type used throughout the core.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
