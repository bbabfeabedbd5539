use super::flattened_text;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;

pub(super) fn extract(document: &Html) -> String {
    lazy_static! {
        static ref UPDATE_TIME_REGEX: Regex = Regex::new(
            r"更新時間\s*[:：]\s*([0-9]{4}/[0-9]{1,2}/[0-9]{1,2}\s+[0-9]{1,2}:[0-9]{2}:[0-9]{2})"
        )
        .expect("UPDATE_TIME_REGEX to compile");
    }

    let text = flattened_text(document.root_element());
    UPDATE_TIME_REGEX
        .captures(&text)
        .and_then(|captures| captures.get(1))
        .map(|timestamp| timestamp.as_str().to_string())
        .unwrap_or_default()
}
