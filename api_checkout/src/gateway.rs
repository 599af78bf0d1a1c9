use std::collections::HashMap;

use async_trait::async_trait;
use common::{
    env_config::Config,
    error::{AppError, Res},
};
use stripe::{
    CheckoutSession, CheckoutSessionBillingAddressCollection, CheckoutSessionCustomerCreation,
    CheckoutSessionMode, Client, CreateCheckoutSession, CreateSubscriptionItem, PriceId,
    Subscription, SubscriptionId, SubscriptionItem,
};

/// A single line of a checkout session. Order is display order on the
/// hosted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub price: String,
    pub quantity: u64,
}

/// Everything a checkout session is created from. The fixed parts of the
/// session (card only, subscription mode, promotion codes, customer
/// creation) are the gateway's business, not the caller's.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub line_items: Vec<LineItem>,
    pub metadata: HashMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct SubscriptionSummary {
    pub id: String,
    pub status: String,
}

/// The payment collaborator as the handlers see it. Production talks to
/// Stripe; tests record calls instead.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, params: &SessionParams) -> Res<CreatedSession>;

    async fn retrieve_subscription(&self, subscription_id: &str) -> Res<SubscriptionSummary>;

    /// Attaches one unit of the given price to an existing subscription.
    /// Returns the created item id.
    async fn create_subscription_item(&self, subscription_id: &str, price_id: &str)
    -> Res<String>;
}

pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            client: common::stripe::create_client(&config.stripe_secret_key),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(&self, params: &SessionParams) -> Res<CreatedSession> {
        let line_items = params
            .line_items
            .iter()
            .map(|item| stripe::CreateCheckoutSessionLineItems {
                price: Some(item.price.clone()),
                quantity: Some(item.quantity),
                ..Default::default()
            })
            .collect();

        let create_params = CreateCheckoutSession {
            payment_method_types: Some(vec![stripe::CreateCheckoutSessionPaymentMethodTypes::Card]),
            line_items: Some(line_items),
            mode: Some(CheckoutSessionMode::Subscription),
            allow_promotion_codes: Some(true),
            billing_address_collection: Some(CheckoutSessionBillingAddressCollection::Auto),
            customer_creation: Some(CheckoutSessionCustomerCreation::Always),
            metadata: Some(params.metadata.clone()),
            success_url: Some(params.success_url.as_str()),
            cancel_url: Some(params.cancel_url.as_str()),
            ..Default::default()
        };

        let session = CheckoutSession::create(&self.client, create_params).await?;
        let url = session.url.clone().ok_or_else(|| {
            AppError::Internal(format!("Checkout session {} has no redirect URL", session.id))
        })?;

        Ok(CreatedSession {
            id: session.id.to_string(),
            url,
        })
    }

    async fn retrieve_subscription(&self, subscription_id: &str) -> Res<SubscriptionSummary> {
        let sub_id = subscription_id.parse::<SubscriptionId>().map_err(|e| {
            AppError::Internal(format!(
                "Failed to parse subscription id: {}. {}",
                subscription_id, e
            ))
        })?;

        let subscription = Subscription::retrieve(&self.client, &sub_id, &[])
            .await
            .map_err(AppError::from)?;

        Ok(SubscriptionSummary {
            id: subscription.id.to_string(),
            status: subscription.status.to_string(),
        })
    }

    async fn create_subscription_item(
        &self,
        subscription_id: &str,
        price_id: &str,
    ) -> Res<String> {
        let sub_id = subscription_id.parse::<SubscriptionId>().map_err(|e| {
            AppError::Internal(format!(
                "Failed to parse subscription id: {}. {}",
                subscription_id, e
            ))
        })?;
        let price = price_id.parse::<PriceId>().map_err(|e| {
            AppError::Internal(format!("Failed to parse price id: {}. {}", price_id, e))
        })?;

        let mut params = CreateSubscriptionItem::new(sub_id);
        params.price = Some(price);
        params.quantity = Some(1);

        let item = SubscriptionItem::create(&self.client, params)
            .await
            .map_err(AppError::from)?;

        Ok(item.id.to_string())
    }
}
