use std::collections::HashMap;

use common::{
    env_config::Config,
    error::{AppError, Res},
};

use crate::dtos::checkout::CheckoutRequest;
use crate::gateway::{CreatedSession, LineItem, PaymentGateway, SessionParams};
use crate::models::catalog;

/// Metadata key carrying the resolved add-on price id, read back by the
/// webhook handler after payment. Empty string when no add-on was bought.
pub(crate) const METADATA_ADDON_PRICE: &str = "active_products_price_id";

/// Metadata key carrying the raw add-on tier amount.
pub(crate) const METADATA_ADDON_AMOUNT: &str = "additional_products_price";

fn required_field<'a>(value: &'a Option<String>, name: &str) -> Res<&'a str> {
    match value.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            log::warn!("Checkout request rejected: missing field {name}");
            Err(AppError::MissingField(name.to_string()))
        }
    }
}

/// Validates a checkout request and creates a session with the payment
/// provider. Validation short-circuits before any provider call: missing
/// fields, then plan/period resolution, then the add-on tier. A nonzero
/// tier that does not resolve to a price hard-fails the request.
pub(crate) async fn create_checkout_session(
    gateway: &dyn PaymentGateway,
    config: &Config,
    req: &CheckoutRequest,
) -> Res<CreatedSession> {
    let plan = required_field(&req.plan, "plan")?;
    let period = required_field(&req.period, "period")?;

    let plan_price = catalog::resolve_plan_price(plan, period).ok_or_else(|| {
        log::warn!("Checkout request rejected: unknown plan/period {plan}/{period}");
        AppError::InvalidPlanPeriod(format!("{plan}/{period}"))
    })?;

    let amount = req.addon_amount;
    if !catalog::is_allowed_addon_amount(amount) {
        log::warn!("Checkout request rejected: add-on amount {amount} not in the tier set");
        return Err(AppError::InvalidAddonAmount(amount));
    }
    let addon_price = if amount > 0 {
        Some(
            catalog::resolve_addon_price(amount)
                .ok_or(AppError::InvalidAddonAmount(amount))?,
        )
    } else {
        None
    };

    let mut line_items = vec![LineItem {
        price: plan_price.to_string(),
        quantity: 1,
    }];
    if let Some(price) = addon_price {
        line_items.push(LineItem {
            price: price.to_string(),
            quantity: 1,
        });
    }

    // The session metadata is the only channel between this handler and the
    // webhook handler; the two requests are otherwise uncorrelated.
    let mut metadata = HashMap::new();
    metadata.insert(
        METADATA_ADDON_PRICE.to_string(),
        addon_price.unwrap_or_default().to_string(),
    );
    metadata.insert(METADATA_ADDON_AMOUNT.to_string(), amount.to_string());

    let params = SessionParams {
        line_items,
        metadata,
        success_url: config.checkout_success_url.clone(),
        cancel_url: config.checkout_cancel_url.clone(),
    };

    gateway.create_checkout_session(&params).await
}
