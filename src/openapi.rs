use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Deadwax API",
        version = "0.1.0",
        description = r#"
Storefront backend for physical music media: releases on vinyl, CD and
cassette, plus merch.

## Authentication

Authenticated endpoints take a JWT bearer token:

```
Authorization: Bearer <token>
```

Admin endpoints additionally require the admin role claim or an
allow-listed email.

## Checkout

`POST /api/v1/checkout/session` mints a hosted payment session and
returns its redirect URL. The payment gateway later reports completion
to `POST /api/v1/payments/webhook`, which materializes the order;
redelivered events are acknowledged without side effects.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Checkout", description = "Hosted checkout sessions"),
        (name = "Payments", description = "Payment gateway webhook"),
        (name = "Releases", description = "Music release catalog"),
        (name = "Merch", description = "Merchandise catalog"),
        (name = "Orders", description = "Order history"),
        (name = "Contact", description = "Contact form"),
        (name = "Health", description = "Health probes")
    ),
    paths(
        crate::handlers::checkout::create_checkout_session,
        crate::handlers::payment_webhooks::payment_webhook,

        crate::handlers::releases::list_releases,
        crate::handlers::releases::get_release,
        crate::handlers::releases::create_release,
        crate::handlers::releases::update_release,
        crate::handlers::releases::upsert_format,
        crate::handlers::releases::set_stock,
        crate::handlers::releases::archive_release,
        crate::handlers::releases::enrich_release,

        crate::handlers::merch::list_merch,
        crate::handlers::merch::get_merch,
        crate::handlers::merch::create_merch,
        crate::handlers::merch::update_merch,
        crate::handlers::merch::archive_merch,

        crate::handlers::orders::list_my_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::list_all_orders,

        crate::handlers::contact::submit_message,
        crate::handlers::contact::list_messages,
        crate::handlers::contact::mark_read,
        crate::handlers::contact::delete_message,

        crate::handlers::health::liveness,
        crate::handlers::health::readiness,
    ),
    components(
        schemas(
            crate::services::checkout::CheckoutItemInput,
            crate::services::checkout::CreateCheckoutSessionInput,
            crate::services::catalog::CreateReleaseInput,
            crate::services::catalog::UpdateReleaseInput,
            crate::services::catalog::FormatInput,
            crate::services::catalog::CreateMerchInput,
            crate::services::catalog::UpdateMerchInput,
            crate::services::catalog::SubmitContactMessageInput,
            crate::services::enrichment::EnrichmentResult,
            crate::handlers::releases::SetStockRequest,
            crate::errors::ErrorResponse,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
