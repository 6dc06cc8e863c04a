//! Text and timestamp helpers shared across the pipeline.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Take at most `max` characters of `text` (char-boundary safe).
pub fn excerpt(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Truncate `text` to at most `limit` words, appending an ellipsis if cut.
pub fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return text.to_string();
    }
    format!("{} …", words[..limit].join(" "))
}

/// Clip `text` to at most `max` characters, appending an ellipsis if cut.
pub fn clip_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    format!("{} …", excerpt(text, max))
}

/// Parse an ISO-8601 timestamp, tolerating a trailing `Z` and missing offset.
///
/// Naive timestamps are assumed to be UTC. Returns `None` on anything
/// unparseable; callers treat that as an absent timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
        if format == "%Y-%m-%d" {
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, format) {
                return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_excerpt_char_boundary() {
        assert_eq!(excerpt("héllo wörld", 5), "héllo");
        assert_eq!(excerpt("ab", 5), "ab");
    }

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("one two three", 5), "one two three");
        assert_eq!(truncate_words("one two three four", 2), "one two …");
    }

    #[test]
    fn test_clip_chars() {
        assert_eq!(clip_chars("short", 10), "short");
        assert_eq!(clip_chars("0123456789", 4), "0123 …");
    }

    #[test]
    fn test_parse_timestamp_with_zulu() {
        let ts = parse_timestamp("2026-01-04T10:30:00Z").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn test_parse_timestamp_naive() {
        assert!(parse_timestamp("2026-01-04T10:30:00").is_some());
        assert!(parse_timestamp("2026-01-04").is_some());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("next tuesday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
