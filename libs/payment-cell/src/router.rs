use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::client::PaymentProviderClient;

#[derive(Clone)]
pub struct PaymentState {
    pub config: Arc<AppConfig>,
    pub client: Arc<PaymentProviderClient>,
}

pub fn payment_routes(state: PaymentState) -> Router {
    // All payment operations require authentication
    let protected_routes = Router::new()
        .route("/intents", post(handlers::create_intent))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
