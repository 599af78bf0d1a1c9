use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{env_config::Config, error::Res, http::Success};

use crate::dtos::checkout::{CheckoutRequest, CheckoutResponse};
use crate::gateway::PaymentGateway;
use crate::services;

/// Creates a checkout session for the pricing page.
///
/// # Input
/// - `req`: JSON payload with the selected plan:
///   - `plan`: Plan name ("Starter", "Growing", "Pro", "Marketer-Leader")
///   - `period`: Billing cadence ("Monthly", "3-Months")
///   - `addonAmount`: (Optional) Add-on tier, one of 0/100/200/300/400/500
/// - `gateway`: Payment gateway handle
/// - `config`: Application configuration with the checkout redirect URLs
///
/// # Output
/// - Success: Returns 200 with `{ url }`, the provider-hosted payment page
/// - Error: Returns 400 Bad Request for validation failures or 500 when the
///   provider call fails
#[post("/session")]
async fn post_session(
    req: web::Json<CheckoutRequest>,
    gateway: web::Data<Arc<dyn PaymentGateway>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let session =
        services::checkout::create_checkout_session(gateway.get_ref().as_ref(), &config, &req)
            .await?;

    Success::ok(CheckoutResponse { url: session.url })
}
