use std::sync::Arc;

use axum::{routing::get, Router};

use availability_cell::router::{availability_routes, AvailabilityState};
use booking_cell::router::{booking_routes, BookingState};
use booking_cell::StaticProviderDirectory;
use payment_cell::router::{payment_routes, PaymentState};
use payment_cell::PaymentProviderClient;
use shared_config::AppConfig;
use shared_store::ScheduleStore;

pub fn create_router(config: Arc<AppConfig>, store: Arc<ScheduleStore>) -> Router {
    let payment_client = Arc::new(PaymentProviderClient::new(&config));
    let directory = Arc::new(StaticProviderDirectory::from_spec(
        &config.provider_categories,
    ));

    let availability_state = AvailabilityState {
        config: config.clone(),
        store: store.clone(),
    };
    let booking_state = BookingState {
        config: config.clone(),
        store: store.clone(),
        directory,
        verifier: payment_client.clone(),
    };
    let payment_state = PaymentState {
        config,
        client: payment_client,
    };

    Router::new()
        .route("/", get(|| async { "Booking Engine API is running!" }))
        .nest("/availability", availability_routes(availability_state))
        .nest("/bookings", booking_routes(booking_state))
        .nest("/payments", payment_routes(payment_state))
}
