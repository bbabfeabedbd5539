use super::flattened_text;
use crate::county::CountyRow;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

/// Phrases that only show up in the suspension status table.
const STATUS_SENTINELS: [&str; 3] = ["停止上班", "上班上課", "尚未宣布"];

const HEADER_LABELS: [&str; 3] = ["縣市名稱", "縣市", "區域"];

const REGION_NAMES: [&str; 6] = [
    "北部地區",
    "中部地區",
    "南部地區",
    "東部地區",
    "外島地區",
    "區域",
];

const REMARKS_MARKER: &str = "備註";

lazy_static! {
    static ref TABLE_SELECTOR: Selector = Selector::parse("table").expect("table selector");
    static ref ROW_SELECTOR: Selector = Selector::parse("tr").expect("row selector");
    static ref CELL_SELECTOR: Selector = Selector::parse("td, th").expect("cell selector");
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    Rows(Vec<CountyRow>),
    /// A table was found but none of its rows describe a county.
    Empty,
    /// The page has no tables at all.
    TableNotFound,
}

pub(super) fn parse(document: &Html) -> ParseOutcome {
    let tables = document.select(&TABLE_SELECTOR).collect::<Vec<_>>();
    let Some(table) = select_status_table(&tables) else {
        return ParseOutcome::TableNotFound;
    };

    let rows = table
        .select(&ROW_SELECTOR)
        .filter_map(parse_row)
        .collect::<Vec<_>>();

    if rows.is_empty() {
        ParseOutcome::Empty
    } else {
        ParseOutcome::Rows(rows)
    }
}

/// First table mentioning a status phrase, falling back to the first table on the page.
fn select_status_table<'a>(tables: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
    tables
        .iter()
        .find(|table| {
            let text = flattened_text(**table);
            STATUS_SENTINELS
                .iter()
                .any(|sentinel| text.contains(sentinel))
        })
        .or_else(|| tables.first())
        .copied()
}

fn parse_row(row: ElementRef) -> Option<CountyRow> {
    let cells = row
        .select(&CELL_SELECTOR)
        .map(flattened_text)
        .collect::<Vec<_>>();

    // Two columns are (county, status); three or more lead with a region which is dropped.
    let (county, status) = match cells.as_slice() {
        [county, status] => (county, status),
        [_region, county, status, ..] => (county, status),
        _ => return None,
    };

    if !is_county_name(county) {
        return None;
    }
    Some(CountyRow::new(county.as_str(), status.as_str()))
}

fn is_county_name(text: &str) -> bool {
    !text.is_empty()
        && !HEADER_LABELS.contains(&text)
        && !REGION_NAMES.contains(&text)
        && !text.contains(REMARKS_MARKER)
}
