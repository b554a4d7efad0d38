//! Small helpers shared by the sites and the bridge.

use crate::page::MediaSession;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    /// `M:SS`, `MM:SS` or `H:MM:SS`, optionally signed for remaining-time labels
    pub static ref TIME_PATTERN: Regex = Regex::new(
        r"^\s*-?(?:\d+:)?\d{1,2}:\d{2}\s*$"
    ).unwrap();
}

/// Convert a `H:MM:SS` style label to seconds.
///
/// A leading `-` (remaining time) is ignored. Returns `None` for anything
/// that is not a time label or does not fit in a `u64` of seconds.
pub fn parse_time(label: &str) -> Option<f64> {
    if !TIME_PATTERN.is_match(label) {
        return None;
    }

    let trimmed = label.trim().trim_start_matches('-');
    trimmed
        .split(':')
        .try_fold(0u64, |acc, part| {
            let value = part.parse::<u64>().ok()?;
            acc.checked_mul(60)?.checked_add(value)
        })
        .map(|seconds| seconds as f64)
}

/// Largest artwork advertised by the media session, or the last one if none
/// declares a size
pub fn media_session_cover(session: &MediaSession) -> String {
    let Some(metadata) = session.metadata.as_ref() else {
        return String::new();
    };

    let area = |sizes: &Option<String>| -> u64 {
        sizes
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .filter_map(|size| {
                let (w, h) = size.to_lowercase().split_once('x').map(|(w, h)| {
                    (w.parse::<u64>().unwrap_or(0), h.parse::<u64>().unwrap_or(0))
                })?;
                Some(w.saturating_mul(h))
            })
            .max()
            .unwrap_or(0)
    };

    let best = metadata
        .artwork
        .iter()
        .map(|art| (area(&art.sizes), art))
        .filter(|(size, _)| *size > 0)
        .max_by_key(|(size, _)| *size)
        .map(|(_, art)| art)
        .or_else(|| metadata.artwork.last());

    best.map(|art| art.src.clone()).unwrap_or_default()
}

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Look up `key` on a page object.
///
/// A direct property named `key` wins. Otherwise `key` is read as a dotted
/// path (`a.b.c`, numeric segments index arrays) and the walk stops at the
/// first missing or falsy segment. Non-object roots yield `None`.
pub fn find_key<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    let object = root.as_object()?;

    if let Some(value) = object.get(key) {
        if !value.is_null() {
            return Some(value);
        }
    }

    let mut current = root;
    for segment in key.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) if is_truthy(value) => current = value,
            _ => return None,
        }
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{MediaImage, MediaMetadata};
    use serde_json::json;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("0:00"), Some(0.0));
        assert_eq!(parse_time("3:25"), Some(205.0));
        assert_eq!(parse_time(" 1:02:03 "), Some(3723.0));
        assert_eq!(parse_time("-0:30"), Some(30.0));
        assert_eq!(parse_time("LIVE"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn test_parse_time_overflow_is_none() {
        assert_eq!(parse_time("9999999999999999:00:00"), None);
        assert_eq!(parse_time("99999999999999999999:00"), None);
    }

    #[test]
    fn test_find_key_nested() {
        let value = json!({ "a": { "b": { "c": 5 } } });
        assert_eq!(find_key(&value, "a.b.c"), Some(&json!(5)));
    }

    #[test]
    fn test_find_key_null_segment() {
        let value = json!({ "a": { "b": null } });
        assert_eq!(find_key(&value, "a.b.c"), None);
    }

    #[test]
    fn test_find_key_non_object_root() {
        assert_eq!(find_key(&json!(5), "a"), None);
        assert_eq!(find_key(&json!("text"), "a.b"), None);
        assert_eq!(find_key(&Value::Null, "a"), None);
    }

    #[test]
    fn test_find_key_direct_hit_wins() {
        let value = json!({ "a.b": 1, "a": { "b": 2 } });
        assert_eq!(find_key(&value, "a.b"), Some(&json!(1)));
    }

    #[test]
    fn test_find_key_array_index_and_falsy() {
        let value = json!({ "list": [{ "id": "x" }], "zero": { "n": 0 } });
        assert_eq!(find_key(&value, "list.0.id"), Some(&json!("x")));
        assert_eq!(find_key(&value, "zero.n"), None);
    }

    #[test]
    fn test_media_session_cover_picks_largest() {
        let session = MediaSession {
            metadata: Some(MediaMetadata {
                artwork: vec![
                    MediaImage { src: "small.jpg".into(), sizes: Some("96x96".into()) },
                    MediaImage { src: "large.jpg".into(), sizes: Some("500x500".into()) },
                    MediaImage { src: "mid.jpg".into(), sizes: Some("256x256".into()) },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(media_session_cover(&session), "large.jpg");
    }

    #[test]
    fn test_media_session_cover_fallbacks() {
        assert_eq!(media_session_cover(&MediaSession::default()), "");

        let session = MediaSession {
            metadata: Some(MediaMetadata {
                artwork: vec![
                    MediaImage { src: "first.jpg".into(), sizes: None },
                    MediaImage { src: "last.jpg".into(), sizes: None },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(media_session_cover(&session), "last.jpg");
    }

    #[test]
    fn test_media_session_cover_huge_sizes() {
        let session = MediaSession {
            metadata: Some(MediaMetadata {
                artwork: vec![
                    MediaImage { src: "normal.jpg".into(), sizes: Some("500x500".into()) },
                    MediaImage {
                        src: "huge.jpg".into(),
                        sizes: Some("9999999999x9999999999".into()),
                    },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(media_session_cover(&session), "huge.jpg");
    }
}
