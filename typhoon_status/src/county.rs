use serde::{Deserialize, Serialize};

/// Display name of a county as published on the source page, e.g. `臺北市`.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountyName(String);

impl PartialEq<str> for CountyName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl std::fmt::Display for CountyName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CountyName {
    fn from(value: String) -> Self {
        CountyName(value)
    }
}

impl From<&str> for CountyName {
    fn from(value: &str) -> Self {
        CountyName(value.to_owned())
    }
}

impl AsRef<str> for CountyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A `(county, status)` pair read from the status table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CountyRow {
    pub county: CountyName,
    pub status: String,
}

impl CountyRow {
    pub fn new(county: impl Into<CountyName>, status: impl Into<String>) -> Self {
        Self {
            county: county.into(),
            status: status.into(),
        }
    }
}

/// On-disk document, one per county. An empty `status` means classes and work are normal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CountyStatus {
    pub source: String,
    pub county: CountyName,
    pub status: String,
}
