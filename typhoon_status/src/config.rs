use anyhow::Context;
use serde::Deserialize;
use shared_kernel::configuration::config;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DGPA_URL: &str = "https://www.dgpa.gov.tw/typh/daily/nds.html";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub scraper: ScraperSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScraperSettings {
    pub source_url: Url,
    pub output_dir: PathBuf,
    pub execution_log_file: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Filled from `SKIP_EXECUTION_LOG`, never from the configuration file.
    #[serde(skip)]
    pub skip_execution_log: bool,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            source_url: Url::parse(DGPA_URL).expect("DGPA_URL to be a valid url"),
            output_dir: PathBuf::from("output"),
            execution_log_file: "execution_log.json".to_string(),
            request_timeout_secs: 20,
            user_agent: USER_AGENT.to_string(),
            skip_execution_log: false,
        }
    }
}

impl ScraperSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Settings {
    pub fn parse() -> anyhow::Result<Self> {
        let mut settings = config::<Settings>().context("Failed to load scraper settings")?;
        settings.scraper.skip_execution_log = std::env::var("SKIP_EXECUTION_LOG")
            .map(|value| is_truthy(&value))
            .unwrap_or(false);
        Ok(settings)
    }
}

/// `1`, `true` and `yes` in any case.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
