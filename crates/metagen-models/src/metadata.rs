//! Generated stock metadata.

use serde::{Deserialize, Serialize};

/// Stock metadata produced for one video.
///
/// Field values are passed through exactly as the model produced them; the
/// keyword count and format are not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: String,
    /// Comma-separated keyword list.
    pub keywords: String,
    pub description: String,
}

impl MetadataRecord {
    pub fn new(
        title: impl Into<String>,
        keywords: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            keywords: keywords.into(),
            description: description.into(),
        }
    }

    /// Split the keyword string into trimmed, non-empty entries.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_list() {
        let record = MetadataRecord::new("t", " ocean, waves ,, sunset ,", "d");
        assert_eq!(record.keyword_list(), vec!["ocean", "waves", "sunset"]);
    }

    #[test]
    fn test_missing_field_rejected() {
        let result: Result<MetadataRecord, _> =
            serde_json::from_str(r#"{"title": "a", "keywords": "b"}"#);
        assert!(result.is_err());
    }
}
