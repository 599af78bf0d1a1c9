use std::sync::Arc;

use actix_web::{HttpRequest, Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};

use crate::gateway::PaymentGateway;
use crate::services;
use crate::services::webhook::ProcessedEvents;

/// Handles Stripe webhook events for checkout reconciliation.
///
/// # Input
/// - `payload`: Raw request bytes; the signature covers the exact wire
///   bytes, so the body must not be parsed before verification
/// - `req`: HTTP request carrying the `stripe-signature` header
/// - `config`: Application configuration with the webhook secret
/// - `gateway`: Payment gateway handle for subscription mutations
/// - `processed`: Event ids already reconciled in this process
///
/// # Output
/// - Success: Returns 200 `{ received: true }` once the signature verifies,
///   regardless of the reconciliation outcome
/// - Error: Returns 400 with a plain-text message when verification fails
///
/// # Note
/// This endpoint is not called from the front end. Stripe's servers call it
/// when a checkout session completes; configure the URL in the Stripe
/// Dashboard under Webhooks and set its signing secret as
/// STRIPE_WEBHOOK_SECRET.
#[post("/webhook")]
async fn post_webhook(
    payload: web::Bytes,
    req: HttpRequest,
    config: web::Data<Arc<Config>>,
    gateway: web::Data<Arc<dyn PaymentGateway>>,
    processed: web::Data<ProcessedEvents>,
) -> Res<impl Responder> {
    let signature = req
        .headers()
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::SignatureVerification("Stripe signature missing".to_string()))?;

    let payload = std::str::from_utf8(&payload)
        .map_err(|_| AppError::SignatureVerification("payload is not valid UTF-8".to_string()))?;

    let event =
        services::webhook::construct_event(payload, signature, &config.stripe_webhook_secret)?;

    // The provider is acknowledged no matter how reconciliation goes;
    // a non-200 here would trigger redelivery and risk duplicate items.
    services::webhook::process_event(gateway.get_ref().as_ref(), &processed, event).await;

    Success::ok(serde_json::json!({ "received": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    use crate::gateway::testing::{RecordingGateway, sign_payload, test_config};
    use crate::mount_webhook;

    fn gateway_data(gateway: &Arc<RecordingGateway>) -> web::Data<Arc<dyn PaymentGateway>> {
        web::Data::new(gateway.clone() as Arc<dyn PaymentGateway>)
    }

    const EVENT_BODY: &str = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    /// A completed-checkout event the way Stripe delivers it, carrying the
    /// session metadata written by the checkout handler. An empty
    /// `addon_price` models a session bought without an add-on.
    fn completed_event_body(event_id: &str, addon_price: &str) -> String {
        serde_json::json!({
            "id": event_id,
            "object": "event",
            "api_version": "2023-10-16",
            "created": 1714000000,
            "data": {
                "object": {
                    "object": "checkout.session",
                    "id": "cs_test_a1B2c3D4e5F6g7H8i9J0kLmN",
                    "automatic_tax": { "enabled": false },
                    "created": 1714000000,
                    "custom_fields": [],
                    "custom_text": {},
                    "expires_at": 1714086400,
                    "livemode": false,
                    "metadata": {
                        "active_products_price_id": addon_price,
                        "additional_products_price": if addon_price.is_empty() { "0" } else { "200" }
                    },
                    "mode": "subscription",
                    "payment_method_types": ["card"],
                    "payment_status": "paid",
                    "shipping_options": [],
                    "status": "complete",
                    "subscription": "sub_1OkQ3GE2nVqLdTwY2uRywI3b"
                }
            },
            "livemode": false,
            "pending_webhooks": 1,
            "type": "checkout.session.completed"
        })
        .to_string()
    }

    #[actix_web::test]
    async fn verified_completed_event_attaches_exactly_one_addon_item() {
        let gateway = Arc::new(RecordingGateway::default());
        let app = test::init_service(
            App::new()
                .app_data(gateway_data(&gateway))
                .app_data(web::Data::new(Arc::new(test_config())))
                .app_data(web::Data::new(ProcessedEvents::default()))
                .service(mount_webhook()),
        )
        .await;

        let addon_price = "price_1R8xUdE2nVqLdTwYbN7hR4tL";
        let body = completed_event_body("evt_1OkQ3HE2nVqLdTwY3vSzxJ4c", addon_price);
        let req = test::TestRequest::post()
            .uri("/pay/webhook")
            .insert_header(("stripe-signature", sign_payload(&body, "whsec_test_secret")))
            .set_payload(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["received"], true);

        assert_eq!(gateway.retrieval_count(), 1);
        let items = gateway.created_items.lock().unwrap();
        assert_eq!(
            items.as_slice(),
            &[(
                "sub_1OkQ3GE2nVqLdTwY2uRywI3b".to_string(),
                addon_price.to_string()
            )]
        );
    }

    #[actix_web::test]
    async fn redelivered_event_is_acknowledged_without_a_second_item() {
        let gateway = Arc::new(RecordingGateway::default());
        let app = test::init_service(
            App::new()
                .app_data(gateway_data(&gateway))
                .app_data(web::Data::new(Arc::new(test_config())))
                .app_data(web::Data::new(ProcessedEvents::default()))
                .service(mount_webhook()),
        )
        .await;

        let body = completed_event_body(
            "evt_1OkQ3HE2nVqLdTwY3vSzxJ4c",
            "price_1R8xUdE2nVqLdTwYbN7hR4tL",
        );
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/pay/webhook")
                .insert_header(("stripe-signature", sign_payload(&body, "whsec_test_secret")))
                .set_payload(body.clone())
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        assert_eq!(gateway.item_count(), 1);
    }

    #[actix_web::test]
    async fn completed_event_without_addon_needs_no_provider_call() {
        let gateway = Arc::new(RecordingGateway::default());
        let app = test::init_service(
            App::new()
                .app_data(gateway_data(&gateway))
                .app_data(web::Data::new(Arc::new(test_config())))
                .app_data(web::Data::new(ProcessedEvents::default()))
                .service(mount_webhook()),
        )
        .await;

        let body = completed_event_body("evt_1OkQ3JE2nVqLdTwY4wTaxK5d", "");
        let req = test::TestRequest::post()
            .uri("/pay/webhook")
            .insert_header(("stripe-signature", sign_payload(&body, "whsec_test_secret")))
            .set_payload(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["received"], true);

        assert_eq!(gateway.retrieval_count(), 0);
        assert_eq!(gateway.item_count(), 0);
    }

    #[actix_web::test]
    async fn tampered_signature_is_rejected_before_reconciliation() {
        let gateway = Arc::new(RecordingGateway::default());
        let app = test::init_service(
            App::new()
                .app_data(gateway_data(&gateway))
                .app_data(web::Data::new(Arc::new(test_config())))
                .app_data(web::Data::new(ProcessedEvents::default()))
                .service(mount_webhook()),
        )
        .await;

        // Signed with the wrong secret: the body looks plausible but the
        // signature does not verify.
        let req = test::TestRequest::post()
            .uri("/pay/webhook")
            .insert_header(("stripe-signature", sign_payload(EVENT_BODY, "whsec_wrong")))
            .set_payload(EVENT_BODY)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = test::read_body(res).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.starts_with("Webhook Error:"), "got: {body}");
        assert!(!body.contains("whsec_"), "must not leak the secret");

        assert_eq!(gateway.retrieval_count(), 0);
        assert_eq!(gateway.item_count(), 0);
    }

    #[actix_web::test]
    async fn missing_signature_header_is_rejected() {
        let gateway = Arc::new(RecordingGateway::default());
        let app = test::init_service(
            App::new()
                .app_data(gateway_data(&gateway))
                .app_data(web::Data::new(Arc::new(test_config())))
                .app_data(web::Data::new(ProcessedEvents::default()))
                .service(mount_webhook()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/pay/webhook")
            .set_payload(EVENT_BODY)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = test::read_body(res).await;
        assert_eq!(body, "Webhook Error: Stripe signature missing".as_bytes());
    }

    #[actix_web::test]
    async fn non_post_methods_answer_405() {
        let gateway = Arc::new(RecordingGateway::default());
        let app = test::init_service(
            App::new()
                .app_data(gateway_data(&gateway))
                .app_data(web::Data::new(Arc::new(test_config())))
                .app_data(web::Data::new(ProcessedEvents::default()))
                .service(mount_webhook()),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/pay/webhook").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
