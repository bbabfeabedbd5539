mod execution_log;
mod file_name;

pub use execution_log::ExecutionLog;
pub use file_name::sanitize_file_stem;

use crate::clock::Clock;
use crate::county::{CountyName, CountyRow, CountyStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to create output directory {}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to list output directory {}", path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct WriteSummary {
    pub written: usize,
    /// Previously tracked counties that were missing from the page and got an empty status.
    pub blanked: Vec<CountyName>,
}

/// The directory holding one JSON document per county plus the execution log.
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    path: PathBuf,
    execution_log_file: String,
}

#[derive(Deserialize)]
struct CountyField {
    county: CountyName,
}

impl OutputDirectory {
    pub fn new(path: impl Into<PathBuf>, execution_log_file: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            execution_log_file: execution_log_file.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn county_file(&self, county: &CountyName, clock: &dyn Clock) -> PathBuf {
        let stem = sanitize_file_stem(county.as_ref(), clock);
        self.path.join(format!("{stem}.json"))
    }

    pub fn execution_log_path(&self) -> PathBuf {
        self.path.join(&self.execution_log_file)
    }

    /// Counties that already have a document, read from each file's `county` field.
    /// Files that can't be read or don't look like a county document are ignored.
    pub fn known_counties(&self) -> Result<Vec<CountyName>, PersistenceError> {
        if !self.path.is_dir() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.path).map_err(|source| PersistenceError::ReadDirectory {
            path: self.path.clone(),
            source,
        })?;

        let mut paths = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
            .filter(|path| {
                path.file_name()
                    .map_or(false, |name| name != self.execution_log_file.as_str())
            })
            .collect::<Vec<_>>();
        paths.sort();

        let counties = paths
            .iter()
            .filter_map(|path| {
                let contents = fs::read_to_string(path)
                    .map_err(|err| debug!(path = %path.display(), "Skipping unreadable file: {err}"))
                    .ok()?;
                serde_json::from_str::<CountyField>(&contents)
                    .map_err(|err| debug!(path = %path.display(), "Skipping non county file: {err}"))
                    .ok()
                    .map(|field| field.county)
            })
            .collect();
        Ok(counties)
    }

    /// Writes every parsed county, then empties the status of tracked counties the page no
    /// longer lists. County files are never deleted.
    pub fn write_county_statuses(
        &self,
        source: &str,
        rows: &[CountyRow],
        clock: &dyn Clock,
    ) -> Result<WriteSummary, PersistenceError> {
        self.ensure_exists()?;
        let known_counties = self.known_counties()?;

        for row in rows {
            let document = CountyStatus {
                source: source.to_string(),
                county: row.county.clone(),
                status: row.status.clone(),
            };
            write_json(&self.county_file(&row.county, clock), &document)?;
        }

        let parsed = rows.iter().map(|row| &row.county).collect::<HashSet<_>>();
        let mut summary = WriteSummary {
            written: rows.len(),
            blanked: vec![],
        };

        for county in known_counties {
            if parsed.contains(&county) {
                continue;
            }
            let document = CountyStatus {
                source: source.to_string(),
                county: county.clone(),
                status: String::new(),
            };
            write_json(&self.county_file(&county, clock), &document)?;
            summary.blanked.push(county);
        }

        Ok(summary)
    }

    pub fn write_execution_log(&self, log: &ExecutionLog) -> Result<(), PersistenceError> {
        self.ensure_exists()?;
        write_json(&self.execution_log_path(), log)
    }

    fn ensure_exists(&self) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.path).map_err(|source| PersistenceError::CreateDirectory {
            path: self.path.clone(),
            source,
        })
    }
}

/// Two-space indented JSON with non-ASCII kept literal and a trailing newline. Replaces
/// whatever the file held before.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let mut contents =
        serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    contents.push('\n');
    fs::write(path, contents).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{ExecutionLog, OutputDirectory, PersistenceError};
    use crate::clock::FixedClock;
    use crate::county::{CountyName, CountyRow, CountyStatus};
    use chrono::{Local, TimeZone};
    use std::fs;
    use std::path::Path;

    const SOURCE: &str = "https://www.dgpa.gov.tw/typh/daily/nds.html";

    fn clock() -> FixedClock {
        FixedClock(Local.with_ymd_and_hms(2024, 7, 24, 21, 0, 0).unwrap())
    }

    fn read_status(path: &Path) -> CountyStatus {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_documents_are_pretty_printed_with_literal_unicode() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::new(directory.path(), "execution_log.json");

        output
            .write_county_statuses(SOURCE, &[CountyRow::new("臺北市", "今天停止上班")], &clock())
            .unwrap();

        let contents = fs::read_to_string(directory.path().join("臺北市.json")).unwrap();
        assert_eq!(
            contents,
            format!(
                "{{\n  \"source\": \"{SOURCE}\",\n  \"county\": \"臺北市\",\n  \"status\": \"今天停止上班\"\n}}\n"
            )
        );
    }

    #[test]
    fn test_counties_missing_from_the_page_are_blanked_not_deleted() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::new(directory.path(), "execution_log.json");
        let clock = clock();

        output
            .write_county_statuses(
                SOURCE,
                &[
                    CountyRow::new("A", "停止上班"),
                    CountyRow::new("B", "停止上課"),
                    CountyRow::new("C", "停止上班、停止上課"),
                ],
                &clock,
            )
            .unwrap();

        let summary = output
            .write_county_statuses(
                SOURCE,
                &[CountyRow::new("A", "正常上班"), CountyRow::new("B", "")],
                &clock,
            )
            .unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.blanked, vec![CountyName::from("C")]);
        assert_eq!(read_status(&directory.path().join("A.json")).status, "正常上班");
        assert_eq!(read_status(&directory.path().join("B.json")).status, "");
        let c = read_status(&directory.path().join("C.json"));
        assert_eq!(c.county, CountyName::from("C"));
        assert_eq!(c.status, "");
    }

    #[test]
    fn test_known_counties_ignore_the_execution_log_and_foreign_files() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::new(directory.path(), "execution_log.json");
        fs::write(
            directory.path().join("execution_log.json"),
            r#"{"source": "x", "county_count": 1, "local_generation_time": "t"}"#,
        )
        .unwrap();
        fs::write(directory.path().join("broken.json"), "{not json").unwrap();
        fs::write(directory.path().join("notes.txt"), r#"{"county": "X"}"#).unwrap();
        fs::write(
            directory.path().join("sanitized_name.json"),
            r#"{"source": "x", "county": "sanitized/name", "status": ""}"#,
        )
        .unwrap();

        let counties = output.known_counties().unwrap();

        assert_eq!(counties, vec![CountyName::from("sanitized/name")]);
    }

    #[test]
    fn test_known_counties_of_a_missing_directory() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::new(directory.path().join("output"), "execution_log.json");

        assert!(output.known_counties().unwrap().is_empty());
    }

    #[test]
    fn test_last_duplicate_wins_on_disk() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::new(directory.path(), "execution_log.json");

        output
            .write_county_statuses(
                SOURCE,
                &[
                    CountyRow::new("臺南市", "停止上班"),
                    CountyRow::new("臺南市", "正常上班"),
                ],
                &clock(),
            )
            .unwrap();

        assert_eq!(
            read_status(&directory.path().join("臺南市.json")).status,
            "正常上班"
        );
    }

    #[test]
    fn test_execution_log_is_overwritten() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::new(directory.path().join("nested"), "execution_log.json");
        let generated_at = Local.with_ymd_and_hms(2024, 7, 24, 21, 0, 0).unwrap();

        output
            .write_execution_log(&ExecutionLog::new(SOURCE, 22, generated_at, "2024/7/24 20:55:00"))
            .unwrap();
        output
            .write_execution_log(&ExecutionLog::new(SOURCE, 2, generated_at, ""))
            .unwrap();

        let log: ExecutionLog =
            serde_json::from_str(&fs::read_to_string(output.execution_log_path()).unwrap())
                .unwrap();
        assert_eq!(log.county_count, 2);
        assert_eq!(log.update_time, None);
    }

    #[test]
    fn test_write_failures_are_reported() {
        let directory = tempfile::tempdir().unwrap();
        let blocker = directory.path().join("output");
        fs::write(&blocker, "a file where the directory should be").unwrap();
        let output = OutputDirectory::new(&blocker, "execution_log.json");

        let result =
            output.write_county_statuses(SOURCE, &[CountyRow::new("臺北市", "")], &clock());

        assert!(matches!(
            result,
            Err(PersistenceError::CreateDirectory { .. })
        ));
    }
}
