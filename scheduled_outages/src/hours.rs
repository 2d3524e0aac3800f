//! Normalization of the free-text outage hours published by the source.
//!
//! Cells mix separators freely: commas, line breaks, or nothing at all when
//! the page strips its own `<br>` tags. Anything that does not normalize to
//! a `HH:MM - HH:MM` range is dropped, never reported as an error.

use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::Regex;
use shared_kernel::date_time::time_frame::TimeFrame;

lazy_static! {
    static ref DASH: Regex = Regex::new(r"\s*-\s*").expect("DASH regex to compile");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("WHITESPACE regex to compile");
    static ref RANGE_SHAPE: Regex =
        Regex::new(r"^\d{1,2}:\d{2} - \d{1,2}:\d{2}$").expect("RANGE_SHAPE regex to compile");
    static ref TIME_SHAPE: Regex =
        Regex::new(r"^\d{1,2}:\d{2}$").expect("TIME_SHAPE regex to compile");
}

/// Splits raw cell text into canonical `"HH:MM - HH:MM"` ranges.
///
/// Splitting happens on any run of commas and newlines, plus the
/// zero-width boundary between a `HH:MM` token and another `HH:MM`
/// directly behind it with no separator at all.
pub fn parse_hours(text: &str) -> Vec<String> {
    let cleaned = text.replace('\r', "");
    let mut hours = Vec::new();

    for segment in cleaned.split(|c: char| c == ',' || c == '\n') {
        for token in split_concatenated_ranges(segment) {
            let token = token.trim();
            if token.is_empty() || !token.contains(':') {
                continue;
            }
            if let Some(normalized) = normalize_time_range(token) {
                hours.push(normalized);
            }
        }
    }

    hours
}

/// Normalizes a single range token to `"HH:MM - HH:MM"`. Returns `None`
/// for anything that does not have that shape once whitespace and the
/// dash are cleaned up. Idempotent on already-canonical input.
pub fn normalize_time_range(token: &str) -> Option<String> {
    let cleaned = DASH.replace_all(token.trim(), " - ");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    RANGE_SHAPE.is_match(&cleaned).then(|| cleaned.into_owned())
}

/// Typed view of a canonical range. An end of `00:00` stands for midnight
/// at the end of the day.
pub fn time_range_bounds(range: &str) -> Option<TimeFrame<NaiveTime>> {
    let mut parts = DASH.splitn(range, 2);
    let from = parse_time(parts.next()?)?;
    let to = parse_time(parts.next()?)?;
    Some(TimeFrame { from, to })
}

fn parse_time(token: &str) -> Option<NaiveTime> {
    let token = token.trim();
    if !TIME_SHAPE.is_match(token) {
        return None;
    }
    let (hour, minute) = token.split_once(':')?;
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// Cuts a segment at every position where one `HH:MM` token ends and the
/// next begins with nothing in between ("08:00 - 12:0020:00 - 23:59").
/// The boundary requires two digits on both sides, so single times and
/// space-separated ranges are left alone.
fn split_concatenated_ranges(segment: &str) -> Vec<&str> {
    let bytes = segment.as_bytes();
    if bytes.len() < 8 {
        return vec![segment];
    }

    let mut cuts = Vec::new();
    for i in 5..=bytes.len() - 3 {
        let before = &bytes[i - 5..i];
        let after = &bytes[i..i + 3];
        let ends_range = before[0].is_ascii_digit()
            && before[1].is_ascii_digit()
            && before[2] == b':'
            && before[3].is_ascii_digit()
            && before[4].is_ascii_digit();
        let starts_range =
            after[0].is_ascii_digit() && after[1].is_ascii_digit() && after[2] == b':';
        if ends_range && starts_range {
            cuts.push(i);
        }
    }

    if cuts.is_empty() {
        return vec![segment];
    }

    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        parts.push(&segment[start..cut]);
        start = cut;
    }
    parts.push(&segment[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::{normalize_time_range, parse_hours, time_range_bounds};
    use chrono::NaiveTime;

    #[test]
    fn parses_standard_format_with_spaces() {
        assert_eq!(parse_hours("13:00 - 17:00"), vec!["13:00 - 17:00"]);
    }

    #[test]
    fn parses_format_without_spaces() {
        assert_eq!(parse_hours("08:00-12:00"), vec!["08:00 - 12:00"]);
    }

    #[test]
    fn parses_comma_separated_ranges() {
        assert_eq!(
            parse_hours("08:00 - 12:00, 20:00 - 23:59"),
            vec!["08:00 - 12:00", "20:00 - 23:59"]
        );
    }

    #[test]
    fn parses_newline_separated_ranges() {
        assert_eq!(
            parse_hours("08:00 - 12:00\n20:00 - 23:59"),
            vec!["08:00 - 12:00", "20:00 - 23:59"]
        );
    }

    #[test]
    fn parses_ranges_concatenated_without_separator() {
        assert_eq!(
            parse_hours("08:00 - 12:0020:00 - 23:59"),
            vec!["08:00 - 12:00", "20:00 - 23:59"]
        );
    }

    #[test]
    fn carriage_returns_are_stripped() {
        assert_eq!(
            parse_hours("08:00 - 12:00\r\n20:00 - 23:59"),
            vec!["08:00 - 12:00", "20:00 - 23:59"]
        );
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(parse_hours("").is_empty());
        assert!(parse_hours("   ").is_empty());
        assert!(parse_hours("\n\n").is_empty());
    }

    #[test]
    fn malformed_fragments_are_dropped_silently() {
        assert!(parse_hours("очікується").is_empty());
        assert!(parse_hours("13:00").is_empty());
        assert_eq!(
            parse_hours("08:00 - 12:00, junk, 20:00 - 23:59"),
            vec!["08:00 - 12:00", "20:00 - 23:59"]
        );
    }

    #[test]
    fn handles_multiple_newline_separated_ranges() {
        assert_eq!(
            parse_hours("06:00 - 10:00\n14:00 - 18:00\n22:00 - 23:59").len(),
            3
        );
    }

    #[test]
    fn normalizes_dash_spacing_variants() {
        assert_eq!(
            normalize_time_range("13:00-17:00").as_deref(),
            Some("13:00 - 17:00")
        );
        assert_eq!(
            normalize_time_range("13:00 -17:00").as_deref(),
            Some("13:00 - 17:00")
        );
        assert_eq!(
            normalize_time_range("13:00- 17:00").as_deref(),
            Some("13:00 - 17:00")
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        assert_eq!(
            normalize_time_range("13:00 - 17:00").as_deref(),
            Some("13:00 - 17:00")
        );
    }

    #[test]
    fn single_digit_hours_are_preserved() {
        assert_eq!(
            normalize_time_range("8:00 - 12:00").as_deref(),
            Some("8:00 - 12:00")
        );
    }

    #[test]
    fn rejects_non_conforming_tokens() {
        assert_eq!(normalize_time_range("invalid"), None);
        assert_eq!(normalize_time_range("13:00"), None);
        assert_eq!(normalize_time_range(""), None);
        assert_eq!(normalize_time_range("8 - 12"), None);
    }

    #[test]
    fn bounds_of_a_standard_range() {
        let bounds = time_range_bounds("13:00 - 17:00").unwrap();
        assert_eq!(bounds.from, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        assert_eq!(bounds.to, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
    }

    #[test]
    fn bounds_accept_single_digit_hour_and_midnight_end() {
        let bounds = time_range_bounds("8:00-12:00").unwrap();
        assert_eq!(bounds.from, NaiveTime::from_hms_opt(8, 0, 0).unwrap());

        let overnight = time_range_bounds("22:00 - 00:00").unwrap();
        assert_eq!(overnight.to, NaiveTime::MIN);
    }

    #[test]
    fn bounds_reject_invalid_input() {
        assert!(time_range_bounds("invalid").is_none());
        assert!(time_range_bounds("13:00").is_none());
        assert!(time_range_bounds("25:00 - 26:00").is_none());
    }
}
