use crate::history::{HistoricalStateProvider, HistoryLookupError, LAST_COMMIT};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use typhoon_status::clock::Clock;
use typhoon_status::county::CountyName;
use typhoon_status::persistence::OutputDirectory;

/// Status assumed for a county whose document is missing or unreadable.
pub const NORMAL_STATUS: &str = "正常上班、正常上課。";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub county: CountyName,
    pub before: String,
    pub after: String,
}

/// Watched counties whose status differs from the last commit, in watch-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(Vec<StatusChange>);

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusChange> {
        self.0.iter()
    }

    pub fn get(&self, county: &str) -> Option<&StatusChange> {
        self.0.iter().find(|change| change.county == *county)
    }

    pub fn counties(&self) -> Vec<&CountyName> {
        self.0.iter().map(|change| &change.county).collect()
    }
}

impl FromIterator<StatusChange> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = StatusChange>>(iter: I) -> Self {
        ChangeSet(iter.into_iter().collect())
    }
}

pub struct ChangeDetector {
    history: Arc<dyn HistoricalStateProvider>,
    /// Each watched county with the file it is stored in.
    watched: Vec<(CountyName, PathBuf)>,
}

impl ChangeDetector {
    /// County files are resolved once here; `clock` only names files for counties whose
    /// sanitized name would be empty.
    pub fn new(
        history: Arc<dyn HistoricalStateProvider>,
        clock: &dyn Clock,
        output: &OutputDirectory,
        watched_counties: Vec<CountyName>,
    ) -> Self {
        let watched = watched_counties
            .into_iter()
            .map(|county| {
                let path = output.county_file(&county, clock);
                (county, path)
            })
            .collect();
        Self { history, watched }
    }

    /// A county whose history can't be read is logged and left out; the others are still checked.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn detect_changes(&self) -> ChangeSet {
        let mut changes = vec![];
        for (county, path) in &self.watched {
            match self.county_change(county, path).await {
                Ok(Some(change)) => {
                    info!(%county, before = %change.before, after = %change.after, "Status changed");
                    changes.push(change);
                }
                Ok(None) => info!(%county, "No status change"),
                Err(err) => error!(%county, "Failed to read the committed status: {err:?}"),
            }
        }
        ChangeSet(changes)
    }

    async fn county_change(
        &self,
        county: &CountyName,
        path: &Path,
    ) -> Result<Option<StatusChange>, HistoryLookupError> {
        let before = self
            .history
            .get(path, LAST_COMMIT)
            .await?
            .and_then(|contents| status_from_document(&contents, path));
        let after = read_current_status(path);

        let before = before.unwrap_or_else(|| NORMAL_STATUS.to_string());
        let after = after.unwrap_or_else(|| NORMAL_STATUS.to_string());

        if before == after {
            return Ok(None);
        }
        Ok(Some(StatusChange {
            county: county.clone(),
            before,
            after,
        }))
    }
}

fn read_current_status(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => status_from_document(&contents, path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No current county file");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), "Failed to read the current county file: {err}");
            None
        }
    }
}

/// The `status` string of a county document, `None` when it can't be parsed or has no status.
fn status_from_document(contents: &str, path: &Path) -> Option<String> {
    let document = serde_json::from_str::<Value>(contents)
        .map_err(|err| warn!(path = %path.display(), "Failed to parse county file: {err}"))
        .ok()?;
    document
        .get("status")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}
