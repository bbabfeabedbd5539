use clap::{CommandFactory, Parser};
use job_runners::test_notifier::test_notification;
use notifications::config::Settings;
use std::process::ExitCode;
use tracing::error;

/// Sends a fixed test card to a Power Automate webhook.
#[derive(Parser)]
struct Args {
    /// Webhook URL of the Power Automate HTTP trigger.
    #[arg(env = "POWER_AUTOMATE_ENDPOINT", hide_env_values = true)]
    endpoint: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    shared_kernel::tracing::config_telemetry();
    let args = Args::parse();

    let endpoint = args.endpoint.filter(|endpoint| !endpoint.trim().is_empty());
    if endpoint.is_none() {
        eprintln!("{}", Args::command().render_help());
    }

    let settings = match Settings::parse() {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err:?}");
            return ExitCode::from(job_runners::EXIT_FAILURE);
        }
    };

    let timeout = settings.notifier.request_timeout();
    ExitCode::from(test_notification(endpoint, timeout).await)
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::{CommandFactory, Parser};

    #[test]
    fn test_help_names_the_endpoint_and_its_variable() {
        Args::command().debug_assert();
        let help = Args::command().render_help().to_string();

        assert!(help.contains("[ENDPOINT]"));
        assert!(help.contains("POWER_AUTOMATE_ENDPOINT"));
    }

    #[test]
    fn test_positional_endpoint() {
        let args = Args::try_parse_from(["test_notification", "https://flows.example.com/trigger"])
            .unwrap();

        assert_eq!(
            args.endpoint.as_deref(),
            Some("https://flows.example.com/trigger")
        );
    }
}
