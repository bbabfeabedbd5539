use crate::adaptive_card::{change_notification_card, CardLinks};
use crate::change_detector::{ChangeDetector, ChangeSet};
use crate::delivery::{DeliveryStrategy, SendError};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub enum NotifyOutcome {
    NoChanges,
    Sent(ChangeSet),
    /// No delivery was configured; `preview` is the card that would have been sent.
    Previewed { changes: ChangeSet, preview: String },
}

pub struct Notifier {
    detector: ChangeDetector,
    delivery: Option<Arc<dyn DeliveryStrategy>>,
    links: CardLinks,
}

impl Notifier {
    pub fn new(
        detector: ChangeDetector,
        delivery: Option<Arc<dyn DeliveryStrategy>>,
        links: CardLinks,
    ) -> Self {
        Self {
            detector,
            delivery,
            links,
        }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn run(&self) -> Result<NotifyOutcome, SendError> {
        let changes = self.detector.detect_changes().await;
        if changes.is_empty() {
            info!("No watched county changed, nothing to send");
            return Ok(NotifyOutcome::NoChanges);
        }

        let counties = changes
            .counties()
            .iter()
            .map(|county| county.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        info!(count = changes.len(), %counties, "Watched counties changed");

        let card = change_notification_card(&changes, &self.links);
        let Some(delivery) = &self.delivery else {
            info!("No webhook endpoint configured, previewing the card instead");
            let preview = serde_json::to_string_pretty(&card)?;
            return Ok(NotifyOutcome::Previewed { changes, preview });
        };

        delivery.deliver(&card).await?;
        Ok(NotifyOutcome::Sent(changes))
    }
}
