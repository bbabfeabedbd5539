use crate::{EXIT_FAILURE, EXIT_SUCCESS};
use notifications::adaptive_card::test_notification_card;
use notifications::delivery::{DeliveryStrategy, WebhookDelivery};
use secrecy::Secret;
use std::time::Duration;
use tracing::error;

const ENDPOINT_PREVIEW_CHARS: usize = 50;

/// Sends the fixed test card so the webhook wiring can be checked by hand.
pub async fn test_notification(endpoint: Option<String>, timeout: Duration) -> u8 {
    let Some(endpoint) = endpoint.filter(|endpoint| !endpoint.trim().is_empty()) else {
        error!("No Power Automate endpoint given");
        return EXIT_FAILURE;
    };

    let card = test_notification_card();
    let preview = match serde_json::to_string_pretty(&card) {
        Ok(preview) => preview,
        Err(err) => {
            error!("Failed to render the test card: {err:?}");
            return EXIT_FAILURE;
        }
    };
    let truncated = endpoint
        .chars()
        .take(ENDPOINT_PREVIEW_CHARS)
        .collect::<String>();
    println!("Endpoint: {truncated}...");
    println!("{preview}");

    let delivery = match WebhookDelivery::new(Secret::new(endpoint), timeout) {
        Ok(delivery) => delivery,
        Err(err) => {
            error!("Failed to build the webhook client: {err:?}");
            return EXIT_FAILURE;
        }
    };

    match delivery.deliver(&card).await {
        Ok(()) => {
            println!("Test notification accepted, check the Teams channel.");
            EXIT_SUCCESS
        }
        Err(err) => {
            error!("Failed to send the test notification: {err:?}");
            EXIT_FAILURE
        }
    }
}
