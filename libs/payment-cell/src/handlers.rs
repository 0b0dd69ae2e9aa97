use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::models::{CreateIntentRequest, PaymentError};
use crate::router::PaymentState;

/// Create a pending payment intent with the external provider. Consumers may
/// only open intents for themselves; admins may open them for anyone.
#[axum::debug_handler]
pub async fn create_intent(
    State(state): State<PaymentState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<Value>, AppError> {
    if request.consumer_id.to_string() != principal.id && !principal.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to create a payment intent for this consumer".to_string(),
        ));
    }

    if request.amount_cents <= 0 {
        return Err(AppError::ValidationError(
            "amount_cents must be positive".to_string(),
        ));
    }

    let currency = request.currency.as_deref().unwrap_or("usd");

    let intent = state
        .client
        .create_intent(
            request.amount_cents,
            currency,
            request.provider_id,
            request.consumer_id,
        )
        .await
        .map_err(|e| match e {
            PaymentError::Timeout => {
                AppError::ExternalService("Payment provider timed out".to_string())
            }
            other => AppError::ExternalService(other.to_string()),
        })?;

    info!(
        "Created payment intent {} for consumer {}",
        intent.reference, request.consumer_id
    );

    Ok(Json(json!({
        "success": true,
        "intent": intent,
    })))
}
