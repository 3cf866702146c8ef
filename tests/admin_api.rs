//! Admin catalog mutations: authorization, validation, uniqueness and
//! the public read side.

mod common;

use axum::body::Body;
use axum::http::{self, Request, StatusCode};

use common::{body_json, TestApp};

fn release_payload(slug: &str) -> serde_json::Value {
    serde_json::json!({
        "id": slug,
        "title": "Blasphemous Death Ritual",
        "artist_id": "vorspellet",
        "catalog_number": "DWX-002",
        "formats": [
            {
                "sku": "DWX002-LP",
                "format_type": "vinyl",
                "price": "24.99",
                "stock": 30,
                "stripe_price_id": "price_dwx002_lp"
            }
        ]
    })
}

#[tokio::test]
async fn non_admin_cannot_create_a_release() {
    let app = TestApp::spawn().await;
    let token = app.token("u1", false);

    let response = app
        .post_json("/api/v1/releases", Some(&token), release_payload("dwx-002"))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_creates_and_reads_back_a_release() {
    let app = TestApp::spawn().await;
    app.seed_catalog().await;
    let token = app.token("admin", true);

    let response = app
        .post_json("/api/v1/releases", Some(&token), release_payload("dwx-002"))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.get("/api/v1/releases/dwx-002").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["release"]["id"], "dwx-002");
    assert_eq!(body["formats"][0]["sku"], "DWX002-LP");
}

#[tokio::test]
async fn duplicate_slug_conflicts() {
    let app = TestApp::spawn().await;
    app.seed_catalog().await;
    let token = app.token("admin", true);

    let response = app
        .post_json(
            "/api/v1/releases",
            Some(&token),
            release_payload("blasphemous-death-ritual"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", true);

    let mut payload = release_payload("dwx-003");
    payload["formats"][0]["price"] = serde_json::json!("-1.00");
    let response = app
        .post_json("/api/v1/releases", Some(&token), payload)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_format_type_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", true);

    let mut payload = release_payload("dwx-004");
    payload["formats"][0]["format_type"] = serde_json::json!("8track");
    let response = app
        .post_json("/api/v1/releases", Some(&token), payload)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn archived_release_disappears_from_public_listing() {
    let app = TestApp::spawn().await;
    app.seed_catalog().await;
    let token = app.token("admin", true);

    let response = app
        .request(
            Request::delete("/api/v1/releases/blasphemous-death-ritual")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get("/api/v1/releases").await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn stock_can_be_set_by_admin() {
    let app = TestApp::spawn().await;
    app.seed_catalog().await;
    let token = app.token("admin", true);

    let response = app
        .put_json(
            "/api/v1/releases/blasphemous-death-ritual/stock",
            Some(&token),
            serde_json::json!({"sku": "BLSDTH-CD", "stock": 7}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.stock_of("BLSDTH-CD").await, 7);
}

#[tokio::test]
async fn contact_message_flow() {
    let app = TestApp::spawn().await;
    let admin = app.token("admin", true);

    // Public submission.
    let response = app
        .post_json(
            "/api/v1/contact",
            None,
            serde_json::json!({
                "name": "U One",
                "email": "u1@example.com",
                "subject": "Shipping",
                "body": "When does DWX-001 ship?"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Invalid email rejected.
    let response = app
        .post_json(
            "/api/v1/contact",
            None,
            serde_json::json!({"name": "x", "email": "not-an-email", "body": "hi"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Admin listing requires the role.
    let response = app.get("/api/v1/contact").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Request::get("/api/v1/contact")
                .header(http::header::AUTHORIZATION, format!("Bearer {admin}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);

    // Mark read, then delete.
    let response = app
        .put_json(
            &format!("/api/v1/contact/{id}/read"),
            Some(&admin),
            serde_json::json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Request::delete(format!("/api/v1/contact/{id}"))
                .header(http::header::AUTHORIZATION, format!("Bearer {admin}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn merch_crud_and_public_listing() {
    let app = TestApp::spawn().await;
    let admin = app.token("admin", true);

    let response = app
        .post_json(
            "/api/v1/merch",
            Some(&admin),
            serde_json::json!({
                "id": "logo-shirt",
                "name": "Logo Shirt",
                "price": "19.99",
                "stock": 40
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .put_json(
            "/api/v1/merch/logo-shirt",
            Some(&admin),
            serde_json::json!({"price": "17.99"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/v1/merch").await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["price"], "17.99");
}
