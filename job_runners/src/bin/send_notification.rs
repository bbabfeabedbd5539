use notifications::config::Settings;
use std::process::ExitCode;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    shared_kernel::tracing::config_telemetry();

    let settings = match Settings::parse() {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err:?}");
            return ExitCode::from(job_runners::EXIT_FAILURE);
        }
    };

    ExitCode::from(job_runners::notifier::send_notification(settings.notifier).await)
}
