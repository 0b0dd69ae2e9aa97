use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::models::{AvailabilityError, CreateWindowRequest, ListQuery, UpdateWindowRequest};
use crate::router::AvailabilityState;
use crate::services::availability::AvailabilityService;

fn map_availability_error(e: AvailabilityError) -> AppError {
    match e {
        AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
        AvailabilityError::Overlap => {
            AppError::Conflict("Proposed slots overlap existing availability".to_string())
        }
        AvailabilityError::NotFound => {
            AppError::NotFound("Availability window not found".to_string())
        }
        AvailabilityError::WindowOccupied => {
            AppError::Conflict("Window contains occupied slots".to_string())
        }
    }
}

/// Create an availability window (with optional recurrence expansion).
/// Providers manage only their own schedule; admins may manage any.
#[axum::debug_handler]
pub async fn create_window(
    State(state): State<AvailabilityState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateWindowRequest>,
) -> Result<Json<Value>, AppError> {
    if request.provider_id.to_string() != principal.id && !principal.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to manage this provider's availability".to_string(),
        ));
    }

    let service = AvailabilityService::new(state.store.clone());
    let response = service
        .create_window(request)
        .await
        .map_err(map_availability_error)?;

    Ok(Json(json!({
        "success": true,
        "window": response.window,
        "expansion": response.expansion,
    })))
}

/// Public listing of a provider's availability. Accepts an optional `date`
/// filter and an optional `from` reference instant for the 30-day view.
#[axum::debug_handler]
pub async fn list_availability(
    State(state): State<AvailabilityState>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(state.store.clone());
    let reference = query.from.unwrap_or_else(Utc::now);
    let windows = service
        .list_availability(provider_id, query.date, reference)
        .await;
    let total = windows.len();

    Ok(Json(json!({
        "provider_id": provider_id,
        "windows": windows,
        "total": total,
    })))
}

#[axum::debug_handler]
pub async fn update_window(
    State(state): State<AvailabilityState>,
    Extension(principal): Extension<Principal>,
    Path(window_id): Path<Uuid>,
    Json(request): Json<UpdateWindowRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(state.store.clone());

    let window = service
        .window(window_id)
        .await
        .ok_or_else(|| AppError::NotFound("Availability window not found".to_string()))?;
    if window.provider_id.to_string() != principal.id && !principal.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to manage this provider's availability".to_string(),
        ));
    }

    let response = service
        .update_window(window_id, request)
        .await
        .map_err(map_availability_error)?;

    Ok(Json(json!({
        "success": true,
        "window": response.window,
        "occupied_slots_dropped": response.occupied_slots_dropped,
    })))
}

#[axum::debug_handler]
pub async fn delete_window(
    State(state): State<AvailabilityState>,
    Extension(principal): Extension<Principal>,
    Path(window_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(state.store.clone());

    let window = service
        .window(window_id)
        .await
        .ok_or_else(|| AppError::NotFound("Availability window not found".to_string()))?;
    if window.provider_id.to_string() != principal.id && !principal.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to manage this provider's availability".to_string(),
        ));
    }

    service
        .delete_window(window_id)
        .await
        .map_err(map_availability_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability window deleted",
    })))
}
