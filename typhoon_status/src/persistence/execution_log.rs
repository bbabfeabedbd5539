use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

const GENERATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata about the last scrape, kept apart from the county documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub source: String,
    pub county_count: usize,
    pub local_generation_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl ExecutionLog {
    pub fn new(
        source: &str,
        county_count: usize,
        generated_at: DateTime<Local>,
        update_time: &str,
    ) -> Self {
        Self {
            source: source.to_string(),
            county_count,
            local_generation_time: generated_at.format(GENERATION_TIME_FORMAT).to_string(),
            update_time: (!update_time.is_empty()).then(|| update_time.to_string()),
        }
    }
}
