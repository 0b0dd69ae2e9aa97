use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;

use crate::models::{BookRequest, BookingError, UpdateStatusRequest};
use crate::router::BookingState;
use crate::services::booking::BookingService;
use crate::services::lifecycle::BookingLifecycleService;

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::NotFound => AppError::NotFound("Booking not found".to_string()),
        BookingError::SlotUnavailable(msg) => AppError::Conflict(msg),
        BookingError::PaymentRequired => {
            AppError::PaymentRequired("Payment reference required for this provider".to_string())
        }
        BookingError::PaymentFailed(msg) => AppError::PaymentRequired(msg),
        BookingError::NotAuthorized => {
            AppError::Auth("Not authorized for this booking".to_string())
        }
        BookingError::InvalidStatusTransition => {
            AppError::Conflict("Booking is not in a state that allows this transition".to_string())
        }
    }
}

fn booking_service(state: &BookingState) -> BookingService {
    BookingService::new(
        state.store.clone(),
        state.directory.clone(),
        state.verifier.clone(),
    )
}

/// Book a slot. Consumers book for themselves; admins may book for anyone.
#[axum::debug_handler]
pub async fn book(
    State(state): State<BookingState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<BookRequest>,
) -> Result<Json<Value>, AppError> {
    if request.consumer_id.to_string() != principal.id && !principal.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to book for this consumer".to_string(),
        ));
    }

    let booking = booking_service(&state)
        .book(request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
    })))
}

#[axum::debug_handler]
pub async fn get_consumer_bookings(
    State(state): State<BookingState>,
    Extension(principal): Extension<Principal>,
    Path(consumer_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if consumer_id.to_string() != principal.id && !principal.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to view these bookings".to_string(),
        ));
    }

    let bookings = booking_service(&state).consumer_bookings(consumer_id).await;
    let total = bookings.len();

    Ok(Json(json!({
        "bookings": bookings,
        "total": total,
    })))
}

#[axum::debug_handler]
pub async fn get_provider_bookings(
    State(state): State<BookingState>,
    Extension(principal): Extension<Principal>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if provider_id.to_string() != principal.id && !principal.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to view these bookings".to_string(),
        ));
    }

    let bookings = booking_service(&state).provider_bookings(provider_id).await;
    let total = bookings.len();

    Ok(Json(json!({
        "bookings": bookings,
        "total": total,
    })))
}

/// Cancel a booking. Ownership is checked against the authenticated
/// principal; the paired slot reopens best-effort.
#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<BookingState>,
    Extension(principal): Extension<Principal>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = BookingLifecycleService::new(state.store.clone());
    let booking = lifecycle
        .cancel(booking_id, &principal)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
    })))
}

/// Administrative status update (complete or cancel).
#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<BookingState>,
    Extension(principal): Extension<Principal>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    if !principal.is_admin() {
        return Err(AppError::Auth(
            "Only administrators may update booking status".to_string(),
        ));
    }

    let lifecycle = BookingLifecycleService::new(state.store.clone());
    let booking = lifecycle
        .update_status(booking_id, request.status)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
    })))
}
