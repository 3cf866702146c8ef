//! Shared integration-test harness: an in-memory application with a
//! stub payment gateway and helpers for issuing tokens and signed
//! webhook deliveries.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use deadwax_api::auth::AuthService;
use deadwax_api::config::AppConfig;
use deadwax_api::entities::{artist, cart, cart_item, order, release, release_format};
use deadwax_api::errors::ServiceError;
use deadwax_api::events::EventSender;
use deadwax_api::gateway::{
    signature, CreateSessionRequest, GatewaySession, PaymentGateway,
};
use deadwax_api::services::AppServices;
use deadwax_api::{app_router, AppState};

pub const WEBHOOK_SECRET: &str = "whsec_test_dummy";

/// Stub gateway: records requests, returns a canned session.
pub struct StubGateway {
    pub requests: Mutex<Vec<CreateSessionRequest>>,
}

#[async_trait::async_trait]
impl PaymentGateway for StubGateway {
    async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<GatewaySession, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(GatewaySession {
            id: "cs_test_stub".to_string(),
            url: "https://checkout.example/cs_test_stub".to_string(),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<sea_orm::DatabaseConnection>,
    pub auth: Arc<AuthService>,
    pub gateway: Arc<StubGateway>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns with config tweaks applied before wiring, e.g. pointing
    /// the metadata service bases at a local mock server.
    pub async fn spawn_with(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::for_tests("sqlite::memory:".to_string());
        tweak(&mut cfg);

        let db = deadwax_api::db::establish_connection(&cfg)
            .await
            .expect("in-memory database");
        deadwax_api::db::run_migrations(&db).await.expect("migrations");
        let db = Arc::new(db);

        let (event_tx, event_rx) = mpsc::channel(64);
        tokio::spawn(deadwax_api::events::process_events(event_rx));
        let event_sender = EventSender::new(event_tx);

        let gateway = Arc::new(StubGateway {
            requests: Mutex::new(vec![]),
        });
        let auth = Arc::new(AuthService::new(&cfg.jwt_secret, vec![]));
        let services = AppServices::new(db.clone(), gateway.clone(), event_sender.clone(), &cfg)
            .expect("services");

        let state = AppState {
            db: db.clone(),
            config: cfg,
            auth: auth.clone(),
            services,
            event_sender,
        };

        Self {
            router: app_router(state),
            db,
            auth,
            gateway,
        }
    }

    /// One release with an LP and a CD format, per the storefront's
    /// canonical scenario.
    pub async fn seed_catalog(&self) {
        let now = Utc::now();
        artist::ActiveModel {
            id: Set("vorspellet".to_string()),
            name: Set("Vorspellet".to_string()),
            country: Set(Some("NO".to_string())),
            bio: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .expect("seed artist");

        release::ActiveModel {
            id: Set("blasphemous-death-ritual".to_string()),
            title: Set("Blasphemous Death Ritual".to_string()),
            artist_id: Set("vorspellet".to_string()),
            label_id: Set(None),
            catalog_number: Set(Some("DWX-001".to_string())),
            barcode: Set(None),
            release_date: Set(None),
            cover_url: Set(None),
            mbid: Set(None),
            country: Set(None),
            description: Set(None),
            is_archived: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .expect("seed release");

        for (sku, format_type, price, stock) in [
            ("BLSDTH-LP-BLK", release_format::FormatType::Vinyl, dec!(24.99), 50),
            ("BLSDTH-CD", release_format::FormatType::Cd, dec!(14.99), 100),
        ] {
            release_format::ActiveModel {
                id: Set(Uuid::new_v4()),
                release_id: Set("blasphemous-death-ritual".to_string()),
                sku: Set(sku.to_string()),
                format_type: Set(format_type),
                variant: Set(None),
                price: Set(price),
                stock: Set(stock),
                stripe_price_id: Set(Some(format!("price_{sku}"))),
            }
            .insert(&*self.db)
            .await
            .expect("seed format");
        }
    }

    /// Seeds a server-side cart for a buyer so cart deletion after
    /// checkout is observable.
    pub async fn seed_cart(&self, uid: &str) {
        cart::ActiveModel {
            user_id: Set(uid.to_string()),
            currency: Set("usd".to_string()),
            updated_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("seed cart");

        cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_user_id: Set(uid.to_string()),
            release_id: Set("blasphemous-death-ritual".to_string()),
            sku: Set("BLSDTH-LP-BLK".to_string()),
            quantity: Set(2),
            unit_price: Set(dec!(24.99)),
            title: Set("Blasphemous Death Ritual".to_string()),
        }
        .insert(&*self.db)
        .await
        .expect("seed cart item");
    }

    pub fn token(&self, uid: &str, admin: bool) -> String {
        self.auth
            .issue_token(uid, &format!("{uid}@example.com"), admin, 3600)
            .expect("token")
    }

    pub async fn request(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.expect("request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response {
        self.json_request(http::Method::POST, uri, token, body).await
    }

    pub async fn put_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response {
        self.json_request(http::Method::PUT, uri, token, body).await
    }

    async fn json_request(
        &self,
        method: http::Method,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Delivers a signed webhook payload, optionally overriding the
    /// signature header.
    pub async fn deliver_webhook(
        &self,
        payload: &serde_json::Value,
        header: Option<String>,
    ) -> Response {
        let body = payload.to_string();
        let header = header.unwrap_or_else(|| {
            signature::sign_header(body.as_bytes(), WEBHOOK_SECRET, Utc::now().timestamp())
        });
        self.request(
            Request::post("/api/v1/payments/webhook")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(signature::SIGNATURE_HEADER, header)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn stock_of(&self, sku: &str) -> i32 {
        release_format::Entity::find()
            .filter(release_format::Column::Sku.eq(sku))
            .one(&*self.db)
            .await
            .expect("query")
            .expect("sku exists")
            .stock
    }

    pub async fn order_count(&self) -> u64 {
        use sea_orm::PaginatorTrait;
        order::Entity::find().count(&*self.db).await.expect("count")
    }

    pub async fn cart_exists(&self, uid: &str) -> bool {
        cart::Entity::find_by_id(uid.to_string())
            .one(&*self.db)
            .await
            .expect("query")
            .is_some()
    }
}

/// The canonical completed-checkout event used across tests.
pub fn completed_event(session_id: &str, uid: &str) -> serde_json::Value {
    let items = serde_json::json!([
        {
            "releaseId": "blasphemous-death-ritual",
            "sku": "BLSDTH-LP-BLK",
            "qty": 2,
            "unitPrice": "24.99",
            "title": "Blasphemous Death Ritual"
        },
        {
            "releaseId": "blasphemous-death-ritual",
            "sku": "BLSDTH-CD",
            "qty": 1,
            "unitPrice": "14.99",
            "title": "Blasphemous Death Ritual"
        }
    ]);
    serde_json::json!({
        "id": format!("evt_{session_id}"),
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "payment_intent": "pi_test_1",
                "currency": "usd",
                "customer_details": {"email": "u1@example.com", "name": "U One"},
                "metadata": {
                    "uid": uid,
                    "items": items.to_string()
                }
            }
        }
    })
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
