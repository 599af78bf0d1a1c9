use dashmap::DashSet;
use stripe::{Event, EventObject, EventType, Webhook};

use common::error::{AppError, Res};

use crate::gateway::PaymentGateway;
use crate::services::checkout::METADATA_ADDON_PRICE;

/// Event ids already reconciled, so provider redeliveries do not attach the
/// same add-on twice. In-process and advisory, like the rate limiter.
pub struct ProcessedEvents {
    seen: DashSet<String>,
    capacity: usize,
}

impl ProcessedEvents {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: DashSet::new(),
            capacity,
        }
    }

    /// Marks the id as processed. Returns false when it was already seen.
    pub fn mark(&self, event_id: &str) -> bool {
        if self.seen.len() >= self.capacity {
            self.seen.clear();
        }
        self.seen.insert(event_id.to_string())
    }
}

impl Default for ProcessedEvents {
    fn default() -> Self {
        Self::new(10_000)
    }
}

/// Creates an event for the webhook based on the request payload and
/// signature. Requires a webhook secret key. Verification failures never
/// reach the dispatch step.
pub(crate) fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    Webhook::construct_event(payload, signature, webhook_secret).map_err(|e| {
        log::error!("Error constructing webhook event: {}", e);
        AppError::SignatureVerification(e.to_string())
    })
}

/// What a completed checkout with a paid add-on asks us to do: attach the
/// add-on price to the subscription the provider just created.
pub(crate) struct AddonAttachment {
    pub(crate) event_id: String,
    pub(crate) subscription_id: String,
    pub(crate) price_id: String,
}

/// Pulls an add-on attachment out of a verified event. Only a completed
/// checkout session carrying a non-empty add-on price in its metadata and
/// a subscription id asks for one.
fn addon_attachment(event: &Event) -> Option<AddonAttachment> {
    if event.type_ != EventType::CheckoutSessionCompleted {
        return None;
    }
    let EventObject::CheckoutSession(session) = &event.data.object else {
        return None;
    };
    let price_id = session.metadata.as_ref()?.get(METADATA_ADDON_PRICE)?.clone();
    if price_id.is_empty() {
        return None;
    }
    let subscription_id = session.subscription.as_ref()?.id().to_string();

    Some(AddonAttachment {
        event_id: event.id.to_string(),
        subscription_id,
        price_id,
    })
}

/// Processes a verified webhook event. Never fails: by the time this runs
/// the provider has already been promised a 200, and failing here would
/// trigger redelivery and risk duplicate subscription items.
pub(crate) async fn process_event(
    gateway: &dyn PaymentGateway,
    processed: &ProcessedEvents,
    event: Event,
) {
    log::info!("Processing webhook event: {}", event.type_);

    match addon_attachment(&event) {
        Some(attachment) => reconcile(gateway, processed, attachment).await,
        None => log::info!("Event {} needs no add-on reconciliation", event.id),
    }
}

/// Attaches the add-on to its subscription, once per event id. Provider
/// failures are logged for operational follow-up and otherwise swallowed.
pub(crate) async fn reconcile(
    gateway: &dyn PaymentGateway,
    processed: &ProcessedEvents,
    attachment: AddonAttachment,
) {
    if !processed.mark(&attachment.event_id) {
        log::info!(
            "Event {} already processed, skipping add-on reconciliation",
            attachment.event_id
        );
        return;
    }

    if let Err(e) = attach_addon(gateway, &attachment).await {
        log::error!(
            "Failed to attach add-on {} to subscription {}: {}",
            attachment.price_id,
            attachment.subscription_id,
            e
        );
    }
}

async fn attach_addon(gateway: &dyn PaymentGateway, attachment: &AddonAttachment) -> Res<()> {
    let subscription = gateway
        .retrieve_subscription(&attachment.subscription_id)
        .await?;
    let item_id = gateway
        .create_subscription_item(&subscription.id, &attachment.price_id)
        .await?;
    log::info!(
        "Attached add-on item {} to subscription {}",
        item_id,
        subscription.id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::RecordingGateway;

    fn attachment(event_id: &str) -> AddonAttachment {
        AddonAttachment {
            event_id: event_id.to_string(),
            subscription_id: "sub_123".to_string(),
            price_id: "price_addon_200".to_string(),
        }
    }

    #[actix_web::test]
    async fn reconcile_attaches_exactly_one_subscription_item() {
        let gateway = RecordingGateway::default();
        let processed = ProcessedEvents::default();

        reconcile(&gateway, &processed, attachment("evt_1")).await;

        assert_eq!(gateway.retrieval_count(), 1);
        let items = gateway.created_items.lock().unwrap();
        assert_eq!(
            items.as_slice(),
            &[("sub_123".to_string(), "price_addon_200".to_string())]
        );
    }

    #[actix_web::test]
    async fn redelivered_event_does_not_attach_a_second_item() {
        let gateway = RecordingGateway::default();
        let processed = ProcessedEvents::default();

        reconcile(&gateway, &processed, attachment("evt_1")).await;
        reconcile(&gateway, &processed, attachment("evt_1")).await;

        assert_eq!(gateway.item_count(), 1);

        // A genuinely new event still reconciles.
        reconcile(&gateway, &processed, attachment("evt_2")).await;
        assert_eq!(gateway.item_count(), 2);
    }

    #[actix_web::test]
    async fn provider_failure_during_reconcile_is_swallowed() {
        let gateway = RecordingGateway {
            fail_create_item: true,
            ..Default::default()
        };
        let processed = ProcessedEvents::default();

        reconcile(&gateway, &processed, attachment("evt_1")).await;

        assert_eq!(gateway.retrieval_count(), 1);
        assert_eq!(gateway.item_count(), 0);
        // The event stays marked: redelivery must not risk a duplicate.
        assert!(!processed.mark("evt_1"));
    }

    #[test]
    fn processed_events_marks_each_id_once() {
        let processed = ProcessedEvents::new(4);
        assert!(processed.mark("evt_1"));
        assert!(!processed.mark("evt_1"));
        assert!(processed.mark("evt_2"));
    }

    #[test]
    fn processed_events_stays_bounded() {
        let processed = ProcessedEvents::new(2);
        assert!(processed.mark("evt_1"));
        assert!(processed.mark("evt_2"));
        // The set is at capacity; the next mark recycles it.
        assert!(processed.mark("evt_3"));
        assert!(processed.seen.len() <= 2);
    }
}
