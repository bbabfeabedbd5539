use std::process::ExitCode;
use tracing::error;
use typhoon_status::config::Settings;

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

    ExitCode::from(job_runners::scraper::scrape(settings.scraper).await)
}
