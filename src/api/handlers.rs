use crate::application::{
    CheckoutOutcome, CheckoutRequest, CheckoutService, ErrorResponse, OffsiteReturnRequest,
    ProfileResponse, ProfileService, StagePaymentInputRequest, UpdateProfileRequest,
};
use crate::domain::errors::CheckoutError;
use crate::infrastructure::config::CheckoutConfig;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect},
};
use std::sync::Arc;
use tracing::{error, info};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub checkout_service: Arc<CheckoutService>,
    pub profile_service: Arc<ProfileService>,
    pub config: Arc<CheckoutConfig>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(code: &str, e: CheckoutError) -> ApiError {
    let status = match &e {
        CheckoutError::Validation(_) | CheckoutError::Integrity(_) => StatusCode::BAD_REQUEST,
        CheckoutError::CartNotFound(_)
        | CheckoutError::OrderNotFound(_)
        | CheckoutError::ProfileNotFound(_)
        | CheckoutError::CustomerNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse::new(code.to_string(), e.to_string())),
    )
}

/// Routes a settlement outcome to its destination: the gateway's page for
/// redirects, otherwise one of the three configured terminal pages.
fn redirect_for(outcome: CheckoutOutcome, config: &CheckoutConfig) -> Redirect {
    match outcome {
        CheckoutOutcome::Redirect { url, .. } => Redirect::to(&url),
        CheckoutOutcome::Success { .. } => Redirect::to(&config.success_url),
        CheckoutOutcome::Failed { .. } => Redirect::to(&config.failed_url),
        CheckoutOutcome::Cancelled { .. } => Redirect::to(&config.cancelled_url),
    }
}

/// Stage payment input for the next checkout call
pub async fn stage_payment_input(
    State(state): State<AppState>,
    Json(request): Json<StagePaymentInputRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Staging payment input for session {}", request.session_id);

    state
        .checkout_service
        .stage_payment_input(request)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| {
            error!("Payment input staging error: {}", e);
            error_response("PAYMENT_INPUT_ERROR", e)
        })
}

/// Settle the cart into an order
pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Received checkout request for cart {}", request.cart_id);

    state
        .checkout_service
        .checkout(request)
        .await
        .map(|outcome| redirect_for(outcome, &state.config))
        .map_err(|e| {
            error!("Checkout error: {}", e);
            error_response("CHECKOUT_ERROR", e)
        })
}

/// Off-site payment return
pub async fn offsite_return(
    State(state): State<AppState>,
    Query(request): Query<OffsiteReturnRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Received off-site return for session {}", request.session_id);

    state
        .checkout_service
        .handle_offsite_return(request)
        .await
        .map(|outcome| redirect_for(outcome, &state.config))
        .map_err(|e| {
            error!("Off-site return error: {}", e);
            error_response("OFFSITE_RETURN_ERROR", e)
        })
}

/// List a customer's payment profiles
pub async fn list_profiles(
    State(state): State<AppState>,
    Path(customer_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .profile_service
        .list_profiles(customer_id)
        .await
        .map(|profiles| {
            let response: Vec<ProfileResponse> = profiles.iter().map(Into::into).collect();
            (StatusCode::OK, Json(response))
        })
        .map_err(|e| {
            error!("Profile list error: {}", e);
            error_response("PROFILE_ERROR", e)
        })
}

/// Create or refresh a customer's tokenized profile
pub async fn update_profile(
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Updating payment profile for customer {}",
        request.customer_id
    );

    state
        .profile_service
        .update_profile(request)
        .await
        .map(|profile| (StatusCode::CREATED, Json(ProfileResponse::from(&profile))))
        .map_err(|e| {
            error!("Profile update error: {}", e);
            error_response("PROFILE_ERROR", e)
        })
}

/// Make a profile the customer's primary one
pub async fn make_profile_primary(
    State(state): State<AppState>,
    Path(profile_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .profile_service
        .make_primary(profile_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| {
            error!("Profile primary error: {}", e);
            error_response("PROFILE_ERROR", e)
        })
}

/// Delete a payment profile
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .profile_service
        .delete_profile(profile_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| {
            error!("Profile delete error: {}", e);
            error_response("PROFILE_ERROR", e)
        })
}

/// Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
