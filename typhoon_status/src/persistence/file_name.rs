use crate::clock::Clock;

const RESERVED_CHARACTERS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Turns a county name into a file stem that is valid on every platform.
///
/// Names that end up empty, `.` or `..` become `unknown_<unix seconds>`.
pub fn sanitize_file_stem(name: &str, clock: &dyn Clock) -> String {
    let stem = name
        .trim()
        .chars()
        .map(|c| if RESERVED_CHARACTERS.contains(&c) { '_' } else { c })
        .collect::<String>();

    match stem.as_str() {
        "" | "." | ".." => format!("unknown_{}", clock.now().timestamp()),
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_file_stem;
    use crate::clock::FixedClock;
    use chrono::{Local, TimeZone};
    use rstest::rstest;

    fn clock() -> FixedClock {
        FixedClock(Local.timestamp_opt(1_721_800_000, 0).unwrap())
    }

    #[rstest]
    #[case("台北/市", "台北_市")]
    #[case("  臺北市 ", "臺北市")]
    #[case(r#"a\b:c*d?e"f<g>h|i"#, "a_b_c_d_e_f_g_h_i")]
    #[case("新北市", "新北市")]
    #[case("...", "...")]
    fn test_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_stem(input, &clock()), expected)
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case(".")]
    #[case("..")]
    fn test_placeholder_for_unusable_names(#[case] input: &str) {
        let stem = sanitize_file_stem(input, &clock());
        assert_eq!(stem, "unknown_1721800000");
    }

    #[rstest]
    #[case("台北/市")]
    #[case(" <金門縣> ")]
    #[case("")]
    fn test_sanitize_is_idempotent(#[case] input: &str) {
        let clock = clock();
        let once = sanitize_file_stem(input, &clock);
        assert_eq!(sanitize_file_stem(&once, &clock), once)
    }
}
