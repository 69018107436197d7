//! API Integration Tests
//!
//! End-to-end through the axum router; requires a database connection.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use wallet_ledger::api::{self, AppState};

mod common;

async fn test_app() -> (Router, sqlx::PgPool) {
    let pool = common::setup_test_db().await;
    let state = AppState {
        pool: pool.clone(),
        settings: common::test_settings(),
    };
    (api::create_router().with_state(state), pool)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_wallet_lifecycle_e2e() {
    let (app, _pool) = test_app().await;

    // 1. Create a wallet
    let response = app
        .clone()
        .oneshot(post_json("/wallets", json!({"userId": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let wallet_id = body["wallet_id"].as_i64().unwrap();

    // 2. Add money
    let response = app
        .clone()
        .oneshot(post_json(
            "/wallets/add",
            json!({"destinationId": wallet_id, "amount": 1000}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["transactionId"].as_i64().unwrap() > 0);

    // 3. Withdraw part of it
    let response = app
        .clone()
        .oneshot(post_json(
            "/wallets/withdraw",
            json!({"sourceId": wallet_id, "amount": 400}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 4. Balance reflects both movements
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/wallets?wallet_id={}", wallet_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["amount"], 600);

    // 5. Ledger shows both entries
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/transactions/wallet?wallet_id={}", wallet_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["type"], "credit");
    assert_eq!(entries[1]["type"], "debit");
}

#[tokio::test]
async fn test_transfer_e2e() {
    let (app, pool) = test_app().await;

    let source = common::seed_wallet(&pool, 1, 1000).await;
    let destination = common::seed_wallet(&pool, 2, 0).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/transactions",
            json!({"sourceId": source, "destinationId": destination, "amount": 250}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(common::balance_of(&pool, source).await, 750);
    assert_eq!(common::balance_of(&pool, destination).await, 250);

    // Query by user with a type filter
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/transactions?user_id=1&type=debit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_error_bodies_are_kind_tagged() {
    let (app, pool) = test_app().await;

    // Unknown wallet -> 404 wallet_not_found
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/wallets?wallet_id=999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error_code"], "wallet_not_found");

    // Insufficient funds -> 400 insufficient_balance
    let wallet_id = common::seed_wallet(&pool, 1, 100).await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/wallets/withdraw",
            json!({"sourceId": wallet_id, "amount": 150}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error_code"], "insufficient_balance");

    // Same-wallet transfer -> 400 invalid_request
    let response = app
        .clone()
        .oneshot(post_json(
            "/transactions",
            json!({"sourceId": wallet_id, "destinationId": wallet_id, "amount": 10}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error_code"], "invalid_request");

    // Balance ceiling -> 422 balance_limit_exceeded
    let limit = common::test_settings().max_balance_limit;
    let full_wallet = common::seed_wallet(&pool, 2, limit - 1).await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/wallets/add",
            json!({"destinationId": full_wallet, "amount": 2}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["error_code"], "balance_limit_exceeded");
    assert_eq!(common::balance_of(&pool, full_wallet).await, limit - 1);
}

#[tokio::test]
async fn test_invalid_type_filter_rejected() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/transactions?user_id=1&type=refund")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error_code"], "invalid_request");
}
