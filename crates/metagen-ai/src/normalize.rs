//! Model output normalization.
//!
//! Models asked for "pure JSON" still wrap it in code fences, prefix a
//! `json` language tag, or leave trailing commas. This module strips that
//! noise and parses the rest strictly.

use std::borrow::Cow;
use std::sync::OnceLock;

use metagen_models::MetadataRecord;
use regex::Regex;
use tracing::debug;

use crate::error::{AiError, AiResult};

static TRAILING_COMMA: OnceLock<Regex> = OnceLock::new();

fn trailing_comma() -> &'static Regex {
    TRAILING_COMMA.get_or_init(|| Regex::new(r",\s*([}\]])").expect("valid regex"))
}

/// Remove commas that directly precede (ignoring whitespace) `}` or `]`.
///
/// Only that one pattern is repaired; `[1,,2]` is left as is.
pub fn strip_trailing_commas(text: &str) -> Cow<'_, str> {
    trailing_comma().replace_all(text, "$1")
}

/// Strip fences, the `json` tag and trailing commas.
pub fn clean_response_text(raw: &str) -> String {
    let mut cleaned = raw.trim().to_string();

    // TODO: decide whether only the fence should be stripped; this also
    // removes backticks inside values.
    if cleaned.starts_with("```") {
        cleaned = cleaned.replace('`', "");
    }

    if cleaned
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("json"))
    {
        cleaned = cleaned[4..].trim().to_string();
    }

    strip_trailing_commas(&cleaned).into_owned()
}

/// Turn raw model text into a metadata record.
///
/// # Errors
///
/// `MalformedResponse` if the cleaned text is not valid JSON or lacks one of
/// `title`, `keywords`, `description`.
pub fn normalize_response(raw: &str) -> AiResult<MetadataRecord> {
    let cleaned = clean_response_text(raw);
    debug!("Normalized model output: {}", cleaned);

    serde_json::from_str(&cleaned).map_err(|e| AiError::malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json_with_trailing_comma() {
        let raw = "```json\n{\"title\":\"a\",\"keywords\":\"b\",\"description\":\"c\",}\n```";
        let record = normalize_response(raw).unwrap();
        assert_eq!(record, MetadataRecord::new("a", "b", "c"));
    }

    #[test]
    fn test_plain_json() {
        let raw = r#"  {"title": "Sunset over calm ocean", "keywords": "sea, sky", "description": "Orange sky."}  "#;
        let record = normalize_response(raw).unwrap();
        assert_eq!(record.title, "Sunset over calm ocean");
        assert_eq!(record.keywords, "sea, sky");
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"title\":\"a\",\"keywords\":\"b\",\"description\":\"c\"}\n```";
        assert_eq!(normalize_response(raw).unwrap(), MetadataRecord::new("a", "b", "c"));
    }

    #[test]
    fn test_uppercase_json_tag() {
        let raw = "```JSON\n{\"title\":\"a\",\"keywords\":\"b\",\"description\":\"c\"}```";
        assert!(normalize_response(raw).is_ok());
    }

    #[test]
    fn test_unfenced_json_tag() {
        let raw = "json {\"title\":\"a\",\"keywords\":\"b\",\"description\":\"c\"}";
        assert!(normalize_response(raw).is_ok());
    }

    #[test]
    fn test_backticks_inside_values_are_removed() {
        let raw = "```json\n{\"title\":\"a `quoted` b\",\"keywords\":\"k\",\"description\":\"d\"}\n```";
        let record = normalize_response(raw).unwrap();
        assert_eq!(record.title, "a quoted b");
    }

    #[test]
    fn test_rejects_non_json() {
        let err = normalize_response("not json at all").unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(_)));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let err = normalize_response(r#"{"title": "a", "keywords": "b"}"#).unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(_)));
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_trailing_comma_scope() {
        assert_eq!(strip_trailing_commas("[1,2,]"), "[1,2]");
        assert_eq!(strip_trailing_commas("{\"a\":1 ,\n }"), "{\"a\":1 }");
        assert_eq!(strip_trailing_commas("[1,,2]"), "[1,,2]");
        assert!(serde_json::from_str::<serde_json::Value>(&strip_trailing_commas("[1,,2]")).is_err());
    }
}
