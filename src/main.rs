use checkout_rs::api::{self, AppState};
use checkout_rs::application::{CheckoutService, ProfileService};
use checkout_rs::infrastructure::adapters::{
    InMemorySessionStore, MySqlCartStore, MySqlOrderRepository, MySqlPaymentLog,
    MySqlProfileStore, RestCardGateway,
};
use checkout_rs::infrastructure::config::{CheckoutConfig, GatewayConfig};
use checkout_rs::infrastructure::crypto::SecretSealer;
use checkout_rs::infrastructure::providers::CardProvider;
use checkout_rs::ports::ProviderRegistry;
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();

    info!("Starting Checkout Service...");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    info!("Connecting to database...");

    let pool = Arc::new(MySqlPool::connect(&database_url).await?);
    info!("Database connected successfully");

    let gateway_config = GatewayConfig::from_env();
    let checkout_config = CheckoutConfig::from_env();
    let sealer = SecretSealer::from_env()?;

    let gateway = Arc::new(RestCardGateway::new(gateway_config.clone())?);

    let orders = Arc::new(MySqlOrderRepository::new(pool.clone()));
    let carts = Arc::new(MySqlCartStore::new(pool.clone()));
    let profiles = Arc::new(MySqlProfileStore::new(pool.clone(), sealer.clone()));
    let payment_log = Arc::new(MySqlPaymentLog::new(pool.clone()));
    let sessions = Arc::new(InMemorySessionStore::new());

    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(CardProvider::new(
        gateway,
        orders.clone(),
        payment_log,
        profiles.clone(),
        gateway_config,
    )));

    let checkout_service = Arc::new(CheckoutService::new(
        carts,
        orders,
        profiles.clone(),
        sessions,
        providers.clone(),
        sealer,
    ));
    let profile_service = Arc::new(ProfileService::new(profiles, providers));

    let app_state = AppState {
        checkout_service,
        profile_service,
        config: checkout_config,
    };

    let app = api::create_router(app_state);

    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET    /health - Health check");
    info!("  POST   /api/checkout/payment-input - Stage payment input");
    info!("  POST   /api/checkout - Settle a cart");
    info!("  GET    /api/checkout/return - Off-site payment return");
    info!("  GET    /api/customers/:customer_id/payment-profiles - List payment profiles");
    info!("  POST   /api/payment-profiles - Create or refresh a payment profile");
    info!("  POST   /api/payment-profiles/:profile_id/primary - Make a profile primary");
    info!("  DELETE /api/payment-profiles/:profile_id - Delete a payment profile");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
