use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_store::ScheduleStore;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

#[derive(Clone)]
pub struct AvailabilityState {
    pub config: Arc<AppConfig>,
    pub store: Arc<ScheduleStore>,
}

pub fn availability_routes(state: AvailabilityState) -> Router {
    // Consumers browse availability without authenticating. The `{id}` in
    // the GET route is a provider id; in PUT/DELETE it is a window id.
    let public_routes = Router::new().route("/{id}", get(handlers::list_availability));

    // Schedule management requires authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::create_window))
        .route("/{id}", put(handlers::update_window))
        .route("/{id}", delete(handlers::delete_window))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
