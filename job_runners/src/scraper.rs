use crate::{EXIT_FAILURE, EXIT_SUCCESS};
use std::sync::Arc;
use tracing::{error, info};
use typhoon_status::clock::SystemClock;
use typhoon_status::config::ScraperSettings;
use typhoon_status::contracts::scrape::ScrapeStatusInteractor;
use typhoon_status::web_page_reader::WebPageReader;

/// Fetches the status page once and rewrites the output directory. Returns the process exit code.
pub async fn scrape(settings: ScraperSettings) -> u8 {
    let reader = match WebPageReader::new(&settings) {
        Ok(reader) => reader,
        Err(err) => {
            error!("Failed to build the page reader: {err:?}");
            return EXIT_FAILURE;
        }
    };

    let interactor = ScrapeStatusInteractor::new(Arc::new(reader), Arc::new(SystemClock), settings);
    match interactor.run().await {
        Ok(report) => {
            info!(
                output_dir = %report.output_dir.display(),
                county_count = report.county_count,
                update_time = %report.update_time,
                preserved_previous_state = report.preserved_previous_state,
                "Scrape finished"
            );
            EXIT_SUCCESS
        }
        Err(err) => {
            error!("Scrape failed: {err:?}");
            err.exit_code()
        }
    }
}
