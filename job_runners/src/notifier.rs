use crate::{EXIT_FAILURE, EXIT_SUCCESS};
use notifications::adaptive_card::CardLinks;
use notifications::change_detector::ChangeDetector;
use notifications::config::NotifierSettings;
use notifications::delivery::{DeliveryStrategy, WebhookDelivery};
use notifications::history::{GitHistory, HistoricalStateProvider};
use notifications::notify::{Notifier, NotifyOutcome};
use std::sync::Arc;
use tracing::{error, info, warn};
use typhoon_status::clock::SystemClock;
use typhoon_status::persistence::OutputDirectory;

/// Compares the watched counties against the last commit of `repository_dir` and reports changes.
pub async fn send_notification(settings: NotifierSettings) -> u8 {
    let history = Arc::new(GitHistory::new(&settings.repository_dir));
    send_notification_with_history(settings, history).await
}

pub async fn send_notification_with_history(
    settings: NotifierSettings,
    history: Arc<dyn HistoricalStateProvider>,
) -> u8 {
    let delivery: Option<Arc<dyn DeliveryStrategy>> = match &settings.endpoint {
        Some(endpoint) => match WebhookDelivery::new(endpoint.clone(), settings.request_timeout())
        {
            Ok(delivery) => Some(Arc::new(delivery)),
            Err(err) => {
                error!("Failed to build the webhook client: {err:?}");
                return EXIT_FAILURE;
            }
        },
        None if settings.running_in_ci => {
            error!("POWER_AUTOMATE_ENDPOINT is not set, it is required when running in GitHub Actions");
            return EXIT_FAILURE;
        }
        None => {
            warn!("POWER_AUTOMATE_ENDPOINT is not set, changes will only be previewed");
            None
        }
    };

    let output = OutputDirectory::new(
        settings.repository_dir.join(&settings.output_dir),
        settings.execution_log_file.as_str(),
    );
    let detector = ChangeDetector::new(
        history,
        &SystemClock,
        &output,
        settings.watched_counties.clone(),
    );
    let links = CardLinks {
        repository_url: settings.repository_url.clone(),
        flow_url: settings.flow_url.clone(),
    };

    match Notifier::new(detector, delivery, links).run().await {
        Ok(NotifyOutcome::NoChanges) => EXIT_SUCCESS,
        Ok(NotifyOutcome::Sent(changes)) => {
            info!(count = changes.len(), "Notification sent");
            EXIT_SUCCESS
        }
        Ok(NotifyOutcome::Previewed { preview, .. }) => {
            println!("{preview}");
            EXIT_SUCCESS
        }
        Err(err) => {
            error!("Failed to send the notification: {err:?}");
            EXIT_FAILURE
        }
    }
}
