//! Checkout session endpoint: authentication, validation and the
//! metadata snapshot handed to the gateway.

mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;

use common::{body_json, TestApp};

fn cart_payload() -> serde_json::Value {
    serde_json::json!({
        "items": [
            {
                "release_id": "blasphemous-death-ritual",
                "sku": "BLSDTH-LP-BLK",
                "qty": 2,
                "stripe_price_id": "price_BLSDTH-LP-BLK",
                "unit_price": "24.99",
                "title": "Blasphemous Death Ritual"
            }
        ],
        "success_url": "https://shop.example/thanks",
        "cancel_url": "https://shop.example/cart"
    })
}

#[tokio::test]
async fn anonymous_checkout_is_unauthorized() {
    let app = TestApp::spawn().await;
    let response = app
        .post_json("/api/v1/checkout/session", None, cart_payload())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.gateway.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn checkout_returns_session_url_and_snapshots_metadata() {
    let app = TestApp::spawn().await;
    let token = app.token("u1", false);

    let response = app
        .post_json("/api/v1/checkout/session", Some(&token), cart_payload())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], "cs_test_stub");
    assert_eq!(body["url"], "https://checkout.example/cs_test_stub");

    let requests = app.gateway.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.buyer_uid, "u1");
    assert_eq!(request.line_items[0].price_id, "price_BLSDTH-LP-BLK");
    assert_eq!(request.line_items[0].quantity, 2);
    assert_eq!(request.items_snapshot[0].unit_price, dec!(24.99));
}

#[tokio::test]
async fn empty_cart_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let token = app.token("u1", false);

    let mut payload = cart_payload();
    payload["items"] = serde_json::json!([]);
    let response = app
        .post_json("/api/v1/checkout/session", Some(&token), payload)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.gateway.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn zero_quantity_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let token = app.token("u1", false);

    let mut payload = cart_payload();
    payload["items"][0]["qty"] = serde_json::json!(0);
    let response = app
        .post_json("/api/v1/checkout/session", Some(&token), payload)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn relative_redirect_url_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let token = app.token("u1", false);

    let mut payload = cart_payload();
    payload["success_url"] = serde_json::json!("/thanks");
    let response = app
        .post_json("/api/v1/checkout/session", Some(&token), payload)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = TestApp::spawn().await;
    let token = app
        .auth
        .issue_token("u1", "u1@example.com", false, -3600)
        .unwrap();

    let response = app
        .post_json("/api/v1/checkout/session", Some(&token), cart_payload())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
