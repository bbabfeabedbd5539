use encoding_rs::{Encoding, UTF_8};
use lazy_static::lazy_static;
use regex::bytes::Regex;

// Browsers only look at the first 1024 bytes for a <meta> charset declaration.
const META_PRESCAN_LIMIT: usize = 1024;

/// Decodes `body` with the charset from the `Content-Type` header, else the one declared in
/// a `<meta>` tag, else UTF-8. Invalid sequences are replaced rather than rejected.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .or_else(|| charset_from_meta(body))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::warn!(
            encoding = used.name(),
            "Page contained malformed byte sequences"
        );
    }
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|parameter| {
        let (key, value) = parameter.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches(|c| c == '"' || c == '\'').as_bytes())
    })
}

fn charset_from_meta(body: &[u8]) -> Option<&'static Encoding> {
    lazy_static! {
        static ref META_CHARSET_REGEX: Regex =
            Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
                .expect("META_CHARSET_REGEX to compile");
    }

    let head = &body[..body.len().min(META_PRESCAN_LIMIT)];
    let captures = META_CHARSET_REGEX.captures(head)?;
    Encoding::for_label(captures.get(1)?.as_bytes())
}
