use serde::{Deserialize, Serialize};

/// Body of a checkout-session request from the pricing page. `plan` and
/// `period` are validated by the service, not by serde, so a missing field
/// reports `MissingField` instead of a deserialization error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub plan: Option<String>,
    pub period: Option<String>,
    // Older front-end builds send the add-on tier under its legacy name.
    #[serde(default, alias = "additionalProductsPrice")]
    pub addon_amount: i64,
}

/// The only thing a successful checkout call echoes back: the URL of the
/// provider-hosted payment page.
#[derive(Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}
