//! Cached tag list used for autocomplete
//!
//! The list is read once at startup from a JSON document and never changes
//! afterwards, so it can be shared between handlers without locking.

pub mod autocomplete;

pub use autocomplete::suggest;

use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// A tag label. Never empty after trimming.
pub type Tag = String;

/// Errors that can occur while reading the tag source
#[derive(Debug, Error)]
pub enum TagsError {
    /// The tag file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is valid JSON but not an array
    #[error("Expected a JSON array of tags, got {0}")]
    NotAnArray(&'static str),
}

/// Immutable, ordered set of known tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCache {
    tags: Vec<Tag>,
}

impl TagCache {
    /// Load tags from a JSON file.
    ///
    /// A missing or malformed file yields an empty cache; the problem is
    /// logged and startup continues.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(cache) => {
                info!("Loaded {} tags from {}", cache.len(), path.display());
                cache
            }
            Err(TagsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Tags file not found: {}", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Error loading tags from {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load tags from a JSON file, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns `TagsError` if the file cannot be read or is not a JSON array.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, TagsError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a JSON array, keeping only non-blank strings.
    ///
    /// # Errors
    ///
    /// Returns `TagsError` if the input is not valid JSON or not an array.
    ///
    /// # Examples
    ///
    /// ```
    /// use cataas_bot::tags::TagCache;
    ///
    /// let cache = TagCache::from_json(r#"["cute", "", 42, "  ", "grumpy"]"#)?;
    /// assert_eq!(cache.all(), ["cute", "grumpy"]);
    /// # Ok::<(), cataas_bot::tags::TagsError>(())
    /// ```
    pub fn from_json(raw: &str) -> Result<Self, TagsError> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Array(items) => Ok(Self::from_candidates(
                items.into_iter().filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                }),
            )),
            Value::Object(_) => Err(TagsError::NotAnArray("object")),
            Value::String(_) => Err(TagsError::NotAnArray("string")),
            Value::Number(_) => Err(TagsError::NotAnArray("number")),
            Value::Bool(_) => Err(TagsError::NotAnArray("bool")),
            Value::Null => Err(TagsError::NotAnArray("null")),
        }
    }

    /// Build a cache from raw candidates, dropping blank ones.
    pub fn from_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = candidates
            .into_iter()
            .map(Into::into)
            .filter(|tag| !tag.trim().is_empty())
            .collect();
        Self { tags }
    }

    /// All tags in source order
    #[must_use]
    pub fn all(&self) -> &[Tag] {
        &self.tags
    }

    /// Number of cached tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the cache holds no tags
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_from_json_keeps_valid_entries_in_order() -> TestResult {
        let raw = r#"["cute", "", "   ", null, 7, {"a": 1}, ["x"], true, "Grumpy", " sleepy "]"#;
        let cache = TagCache::from_json(raw)?;
        assert_eq!(cache.all(), ["cute", "Grumpy", " sleepy "]);
        Ok(())
    }

    #[test]
    fn test_duplicates_are_tolerated() -> TestResult {
        let cache = TagCache::from_json(r#"["cute", "cute"]"#)?;
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(matches!(
            TagCache::from_json(r#"{"tags": []}"#),
            Err(TagsError::NotAnArray("object"))
        ));
        assert!(matches!(
            TagCache::from_json("not json"),
            Err(TagsError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let cache = TagCache::load(dir.path().join("nope.json"));
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_malformed_file_is_empty() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "[\"cute\", ")?;
        let cache = TagCache::load(file.path());
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"["cute", "", "orange"]"#)?;
        file.flush()?;
        let cache = TagCache::load(file.path());
        assert_eq!(cache.all(), ["cute", "orange"]);
        Ok(())
    }
}
