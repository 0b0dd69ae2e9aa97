use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use payment_cell::router::{payment_routes, PaymentState};
use payment_cell::services::client::{PaymentProviderClient, PaymentVerifier};
use payment_cell::{PaymentError, PaymentIntentStatus};
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestPrincipal};

fn test_config(mock_server: &MockServer) -> AppConfig {
    let mut config = TestConfig::default().to_app_config();
    config.payment_base_url = mock_server.uri();
    config
}

fn create_test_app(config: AppConfig) -> Router {
    let config = Arc::new(config);
    let client = Arc::new(PaymentProviderClient::new(&config));
    payment_routes(PaymentState { config, client })
}

#[tokio::test]
async fn test_create_intent_success() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let consumer_id = Uuid::new_v4();
    let provider_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reference": "pi_test_123",
            "amount_cents": 5000,
            "currency": "usd",
            "status": "pending",
            "provider_id": provider_id,
            "consumer_id": consumer_id,
            "created_at": null,
        })))
        .mount(&mock_server)
        .await;

    let principal = TestPrincipal::consumer(&consumer_id.to_string());
    let token = JwtTestUtils::create_token(&principal, &config.jwt_secret);
    let app = create_test_app(config);

    let request_body = json!({
        "amount_cents": 5000,
        "currency": "usd",
        "provider_id": provider_id,
        "consumer_id": consumer_id,
    });

    let request = Request::builder()
        .method("POST")
        .uri("/intents")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(request_body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["intent"]["reference"], "pi_test_123");
    assert_eq!(json_response["intent"]["status"], "pending");
}

#[tokio::test]
async fn test_create_intent_requires_auth() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server));

    let request = Request::builder()
        .method("POST")
        .uri("/intents")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "amount_cents": 5000,
                "provider_id": Uuid::new_v4(),
                "consumer_id": Uuid::new_v4(),
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_intent_for_other_consumer_is_forbidden() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let principal = TestPrincipal::consumer(&Uuid::new_v4().to_string());
    let token = JwtTestUtils::create_token(&principal, &config.jwt_secret);
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/intents")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "amount_cents": 5000,
                "provider_id": Uuid::new_v4(),
                "consumer_id": Uuid::new_v4(),
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_intent_rejects_non_positive_amount() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let consumer_id = Uuid::new_v4();
    let principal = TestPrincipal::consumer(&consumer_id.to_string());
    let token = JwtTestUtils::create_token(&principal, &config.jwt_secret);
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/intents")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "amount_cents": 0,
                "provider_id": Uuid::new_v4(),
                "consumer_id": consumer_id,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verifier_reports_intent_status() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    Mock::given(method("GET"))
        .and(path("/v1/payment_intents/pi_ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reference": "pi_ok",
            "amount_cents": 5000,
            "currency": "usd",
            "status": "succeeded",
            "provider_id": Uuid::new_v4(),
            "consumer_id": Uuid::new_v4(),
            "created_at": null,
        })))
        .mount(&mock_server)
        .await;

    let client = PaymentProviderClient::new(&config);
    let status = client.intent_status("pi_ok").await.unwrap();
    assert_eq!(status, PaymentIntentStatus::Succeeded);
}

#[tokio::test]
async fn test_verifier_maps_missing_reference() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    Mock::given(method("GET"))
        .and(path("/v1/payment_intents/pi_missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = PaymentProviderClient::new(&config);
    let err = client.intent_status("pi_missing").await.unwrap_err();
    assert!(matches!(err, PaymentError::ReferenceNotFound));
}
