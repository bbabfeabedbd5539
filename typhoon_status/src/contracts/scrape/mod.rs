use crate::clock::Clock;
use crate::config::ScraperSettings;
use crate::county::{CountyName, CountyRow};
use crate::page_parser::{parse_page, ParseOutcome};
use crate::persistence::{ExecutionLog, OutputDirectory, PersistenceError};
use crate::web_page_reader::{FetchError, PageSource};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ScrapeError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ScrapeError::Fetch(_) => 1,
            ScrapeError::Persistence(_) => 2,
        }
    }
}

#[derive(Debug)]
pub struct ScrapeReport {
    pub output_dir: PathBuf,
    pub county_count: usize,
    pub blanked: Vec<CountyName>,
    pub update_time: String,
    /// True when the page had no table at all and county files were left alone.
    pub preserved_previous_state: bool,
}

pub struct ScrapeStatusInteractor {
    page_source: Arc<dyn PageSource>,
    clock: Arc<dyn Clock>,
    settings: ScraperSettings,
}

impl ScrapeStatusInteractor {
    pub fn new(
        page_source: Arc<dyn PageSource>,
        clock: Arc<dyn Clock>,
        settings: ScraperSettings,
    ) -> Self {
        Self {
            page_source,
            clock,
            settings,
        }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn run(&self) -> Result<ScrapeReport, ScrapeError> {
        let html = self.page_source.fetch().await?;
        let page = parse_page(&html);

        let output = OutputDirectory::new(
            &self.settings.output_dir,
            self.settings.execution_log_file.as_str(),
        );
        let source = self.settings.source_url.as_str();

        let mut report = ScrapeReport {
            output_dir: output.path().to_path_buf(),
            county_count: 0,
            blanked: vec![],
            update_time: page.update_time.clone(),
            preserved_previous_state: false,
        };

        let rows: &[CountyRow] = match &page.counties {
            ParseOutcome::Rows(rows) => rows,
            ParseOutcome::Empty => {
                warn!("The status table lists no counties, resetting tracked counties to an empty status");
                &[]
            }
            ParseOutcome::TableNotFound => {
                warn!("No table found on the status page, check whether the page layout changed. Keeping previous county files");
                report.preserved_previous_state = true;
                &[]
            }
        };

        if !report.preserved_previous_state {
            let summary = output.write_county_statuses(source, rows, self.clock.as_ref())?;
            if !summary.blanked.is_empty() {
                info!(
                    blanked = ?summary.blanked,
                    "Counties no longer listed on the page were reset to an empty status"
                );
            }
            report.county_count = rows.len();
            report.blanked = summary.blanked;
        }

        if self.settings.skip_execution_log {
            info!("SKIP_EXECUTION_LOG is set, not writing the execution log");
        } else {
            let log = ExecutionLog::new(
                source,
                report.county_count,
                self.clock.now(),
                &page.update_time,
            );
            output.write_execution_log(&log)?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::{ScrapeError, ScrapeStatusInteractor};
    use crate::clock::FixedClock;
    use crate::config::ScraperSettings;
    use crate::county::{CountyName, CountyStatus};
    use crate::persistence::ExecutionLog;
    use crate::web_page_reader::{FetchError, PageSource};
    use async_trait::async_trait;
    use chrono::{Local, TimeZone};
    use shared_kernel::http_client::HttpClientError;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use url::Url;

    struct StaticPage(&'static str);

    #[async_trait]
    impl PageSource for StaticPage {
        async fn fetch(&self) -> Result<String, FetchError> {
            Ok(self.0.to_string())
        }
    }

    struct UnreachablePage;

    #[async_trait]
    impl PageSource for UnreachablePage {
        async fn fetch(&self) -> Result<String, FetchError> {
            Err(FetchError::from(HttpClientError::Timeout {
                url: Url::parse("https://www.dgpa.gov.tw/typh/daily/nds.html").unwrap(),
            }))
        }
    }

    const STATUS_PAGE: &str = r#"<html><body>
        <div>更新時間：2024/7/24 21:05:33</div>
        <table>
            <tr><th>縣市名稱</th><th>停止上班上課情形</th></tr>
            <tr><td>臺北市</td><td>今天停止上班</td></tr>
            <tr><td>新北市</td><td>正常上班、正常上課。</td></tr>
        </table>
    </body></html>"#;

    fn interactor(
        page: impl PageSource + 'static,
        output_dir: &Path,
        skip_execution_log: bool,
    ) -> ScrapeStatusInteractor {
        let settings = ScraperSettings {
            output_dir: output_dir.to_path_buf(),
            skip_execution_log,
            ..ScraperSettings::default()
        };
        let clock = FixedClock(Local.with_ymd_and_hms(2024, 7, 24, 21, 10, 0).unwrap());
        ScrapeStatusInteractor::new(Arc::new(page), Arc::new(clock), settings)
    }

    fn read<T: serde::de::DeserializeOwned>(path: &Path) -> T {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_scrape_writes_counties_and_execution_log() {
        let directory = tempfile::tempdir().unwrap();

        let report = interactor(StaticPage(STATUS_PAGE), directory.path(), false)
            .run()
            .await
            .unwrap();

        assert_eq!(report.county_count, 2);
        let taipei: CountyStatus = read(&directory.path().join("臺北市.json"));
        assert_eq!(taipei.status, "今天停止上班");
        let new_taipei: CountyStatus = read(&directory.path().join("新北市.json"));
        assert_eq!(new_taipei.status, "正常上班、正常上課。");

        let log: ExecutionLog = read(&directory.path().join("execution_log.json"));
        assert_eq!(log.county_count, 2);
        assert_eq!(log.update_time.as_deref(), Some("2024/7/24 21:05:33"));
        assert_eq!(log.local_generation_time, "2024-07-24 21:10:00");
        assert_eq!(log.source, "https://www.dgpa.gov.tw/typh/daily/nds.html");
    }

    #[tokio::test]
    async fn test_execution_log_can_be_skipped() {
        let directory = tempfile::tempdir().unwrap();

        interactor(StaticPage(STATUS_PAGE), directory.path(), true)
            .run()
            .await
            .unwrap();

        assert!(directory.path().join("臺北市.json").exists());
        assert!(!directory.path().join("execution_log.json").exists());
    }

    #[tokio::test]
    async fn test_unparseable_page_keeps_previous_county_files() {
        let directory = tempfile::tempdir().unwrap();
        interactor(StaticPage(STATUS_PAGE), directory.path(), false)
            .run()
            .await
            .unwrap();

        let report = interactor(
            StaticPage("<html><body>系統維護中</body></html>"),
            directory.path(),
            false,
        )
        .run()
        .await
        .unwrap();

        assert!(report.preserved_previous_state);
        assert!(report.blanked.is_empty());
        let taipei: CountyStatus = read(&directory.path().join("臺北市.json"));
        assert_eq!(taipei.status, "今天停止上班");
        let log: ExecutionLog = read(&directory.path().join("execution_log.json"));
        assert_eq!(log.county_count, 0);
        assert_eq!(log.update_time, None);
    }

    #[tokio::test]
    async fn test_table_without_counties_blanks_tracked_counties() {
        let directory = tempfile::tempdir().unwrap();
        interactor(StaticPage(STATUS_PAGE), directory.path(), false)
            .run()
            .await
            .unwrap();

        let report = interactor(
            StaticPage(
                r#"<table>
                    <tr><th>縣市名稱</th><th>停止上班上課情形</th></tr>
                    <tr><td>無停止上班上課訊息</td></tr>
                </table>"#,
            ),
            directory.path(),
            false,
        )
        .run()
        .await
        .unwrap();

        assert!(!report.preserved_previous_state);
        assert_eq!(
            report.blanked,
            vec![CountyName::from("新北市"), CountyName::from("臺北市")]
        );
        let taipei: CountyStatus = read(&directory.path().join("臺北市.json"));
        assert_eq!(taipei.status, "");
        let log: ExecutionLog = read(&directory.path().join("execution_log.json"));
        assert_eq!(log.county_count, 0);
    }

    #[tokio::test]
    async fn test_dropped_counties_are_blanked() {
        let directory = tempfile::tempdir().unwrap();
        interactor(StaticPage(STATUS_PAGE), directory.path(), false)
            .run()
            .await
            .unwrap();

        let report = interactor(
            StaticPage(
                "<table><tr><td>新北市</td><td>今天停止上班、停止上課。</td></tr></table>",
            ),
            directory.path(),
            false,
        )
        .run()
        .await
        .unwrap();

        assert_eq!(report.blanked, vec![CountyName::from("臺北市")]);
        let taipei: CountyStatus = read(&directory.path().join("臺北市.json"));
        assert_eq!(taipei.status, "");
    }

    #[tokio::test]
    async fn test_fetch_failures_map_to_exit_code_one() {
        let directory = tempfile::tempdir().unwrap();

        let error = interactor(UnreachablePage, directory.path(), false)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(error, ScrapeError::Fetch(_)));
        assert_eq!(error.exit_code(), 1);
        assert!(fs::read_dir(directory.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_persistence_failures_map_to_exit_code_two() {
        let directory = tempfile::tempdir().unwrap();
        let blocker = directory.path().join("output");
        fs::write(&blocker, "").unwrap();

        let error = interactor(StaticPage(STATUS_PAGE), &blocker, false)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(error, ScrapeError::Persistence(_)));
        assert_eq!(error.exit_code(), 2);
    }
}
