mod county_table;
mod update_time;

pub use county_table::ParseOutcome;

use scraper::{ElementRef, Html};

#[derive(Debug)]
pub struct ParsedPage {
    /// `YYYY/M/D H:MM:SS` as printed on the page, empty when the page has none.
    pub update_time: String,
    pub counties: ParseOutcome,
}

pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);
    ParsedPage {
        update_time: update_time::extract(&document),
        counties: county_table::parse(&document),
    }
}

/// Every non-blank text node under `element`, trimmed and joined by single spaces.
pub(crate) fn flattened_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
