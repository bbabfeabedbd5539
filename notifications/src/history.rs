use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// The last committed revision of the working copy.
pub const LAST_COMMIT: &str = "HEAD";

#[derive(Error, Debug)]
pub enum HistoryLookupError {
    #[error("Failed to run git in {}", repository_dir.display())]
    Spawn {
        repository_dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} at {revision} is not valid UTF-8", path.display())]
    InvalidUtf8 {
        path: PathBuf,
        revision: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Read access to earlier versions of the output files.
#[async_trait]
pub trait HistoricalStateProvider: Send + Sync {
    /// Contents of `path` as of `revision`, or `None` when that revision doesn't have the file.
    async fn get(&self, path: &Path, revision: &str) -> Result<Option<String>, HistoryLookupError>;
}

/// Reads file history with `git show <revision>:<path>`. Paths under `repository_dir` are
/// looked up relative to it.
pub struct GitHistory {
    repository_dir: PathBuf,
}

impl GitHistory {
    pub fn new(repository_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository_dir: repository_dir.into(),
        }
    }
}

/// `./`-prefixed so git resolves the path from the working directory, with `/` separators.
fn object_path(path: &Path) -> String {
    let relative = path
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if relative.starts_with("./") {
        relative
    } else {
        format!("./{relative}")
    }
}

#[async_trait]
impl HistoricalStateProvider for GitHistory {
    #[tracing::instrument(err, skip(self), level = "debug")]
    async fn get(&self, path: &Path, revision: &str) -> Result<Option<String>, HistoryLookupError> {
        let relative = path.strip_prefix(&self.repository_dir).unwrap_or(path);
        let object = format!("{revision}:{}", object_path(relative));
        let output = Command::new("git")
            .arg("show")
            .arg(&object)
            .current_dir(&self.repository_dir)
            .output()
            .await
            .map_err(|source| HistoryLookupError::Spawn {
                repository_dir: self.repository_dir.clone(),
                source,
            })?;

        if !output.status.success() {
            debug!(
                object = %object,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "No committed version found"
            );
            return Ok(None);
        }

        String::from_utf8(output.stdout)
            .map(Some)
            .map_err(|source| HistoryLookupError::InvalidUtf8 {
                path: path.to_path_buf(),
                revision: revision.to_string(),
                source,
            })
    }
}

/// History kept in memory, keyed by `(revision, path)`.
#[cfg(any(test, feature = "test-util"))]
#[derive(Default)]
pub struct InMemoryHistory {
    files: std::collections::HashMap<(String, PathBuf), String>,
}

#[cfg(any(test, feature = "test-util"))]
impl InMemoryHistory {
    pub fn with_file(
        mut self,
        revision: &str,
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
    ) -> Self {
        self.files
            .insert((revision.to_string(), path.into()), contents.into());
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl HistoricalStateProvider for InMemoryHistory {
    async fn get(&self, path: &Path, revision: &str) -> Result<Option<String>, HistoryLookupError> {
        Ok(self
            .files
            .get(&(revision.to_string(), path.to_path_buf()))
            .cloned())
    }
}
