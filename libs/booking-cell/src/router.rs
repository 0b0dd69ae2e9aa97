use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use payment_cell::PaymentVerifier;
use shared_config::AppConfig;
use shared_store::ScheduleStore;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::directory::ProviderDirectory;

#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<ScheduleStore>,
    pub directory: Arc<dyn ProviderDirectory>,
    pub verifier: Arc<dyn PaymentVerifier>,
}

pub fn booking_routes(state: BookingState) -> Router {
    // All booking operations require authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::book))
        .route("/consumers/{consumer_id}", get(handlers::get_consumer_bookings))
        .route("/providers/{provider_id}", get(handlers::get_provider_bookings))
        .route("/{booking_id}/cancel", post(handlers::cancel_booking))
        .route("/{booking_id}/status", patch(handlers::update_booking_status))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
