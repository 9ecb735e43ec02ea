use super::handlers::*;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/checkout/payment-input", post(stage_payment_input))
        .route("/api/checkout", post(checkout))
        .route("/api/checkout/return", get(offsite_return))
        .route(
            "/api/customers/:customer_id/payment-profiles",
            get(list_profiles),
        )
        .route("/api/payment-profiles", post(update_profile))
        .route(
            "/api/payment-profiles/:profile_id/primary",
            post(make_profile_primary),
        )
        .route("/api/payment-profiles/:profile_id", delete(delete_profile))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
