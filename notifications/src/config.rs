use anyhow::Context;
use secrecy::Secret;
use serde::Deserialize;
use shared_kernel::configuration::config;
use std::path::PathBuf;
use std::time::Duration;
use typhoon_status::county::CountyName;

pub const REPOSITORY_URL: &str = "https://github.com/InfernoPC/typhoon_vacation";
pub const FLOW_URL: &str = "https://make.powerautomate.com/environments/ce11858d-af1c-e80a-9766-7541e365ec90/flows/c0119267-9a89-46a5-b285-8c9d6e5f1211/details";

#[derive(Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub notifier: NotifierSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotifierSettings {
    pub watched_counties: Vec<CountyName>,
    pub output_dir: PathBuf,
    pub execution_log_file: String,
    /// Working copy that `git show` runs in. `output_dir` is resolved relative to it.
    pub repository_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub repository_url: String,
    pub flow_url: String,
    /// From `POWER_AUTOMATE_ENDPOINT`.
    #[serde(skip)]
    pub endpoint: Option<Secret<String>>,
    /// From `GITHUB_ACTIONS`.
    #[serde(skip)]
    pub running_in_ci: bool,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            watched_counties: vec![CountyName::from("臺北市"), CountyName::from("新北市")],
            output_dir: PathBuf::from("output"),
            execution_log_file: "execution_log.json".to_string(),
            repository_dir: PathBuf::from("."),
            request_timeout_secs: 30,
            repository_url: REPOSITORY_URL.to_string(),
            flow_url: FLOW_URL.to_string(),
            endpoint: None,
            running_in_ci: false,
        }
    }
}

impl NotifierSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Settings {
    pub fn parse() -> anyhow::Result<Self> {
        let mut settings = config::<Settings>().context("Failed to load notifier settings")?;
        settings.notifier.endpoint = endpoint_from_env();
        settings.notifier.running_in_ci = std::env::var("GITHUB_ACTIONS")
            .map(|value| value == "true")
            .unwrap_or(false);
        Ok(settings)
    }
}

/// `POWER_AUTOMATE_ENDPOINT`, treating an empty value as unset.
pub fn endpoint_from_env() -> Option<Secret<String>> {
    std::env::var("POWER_AUTOMATE_ENDPOINT")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Secret::new)
}
