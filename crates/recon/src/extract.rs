//! Account id extraction from bank transaction descriptions.
//!
//! A tagged description looks like `TXEFILE*012345678-0`: the tag, a `*0`
//! separator, the 8-character id and a `-0` trailer.

use crate::config::ExtractConfig;

/// Result of looking at one description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Description does not start with the tag. The normal case.
    Untagged,
    /// Tagged, and the stripped id has the configured length.
    Id(String),
    /// Tagged, but the stripped candidate has the wrong length.
    BadLength(String),
}

#[derive(Debug, Clone)]
pub struct IdExtractor {
    tag: String,
    strip_prefix: String,
    strip_suffix: String,
    id_len: usize,
}

impl IdExtractor {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            tag: config.tag.clone(),
            strip_prefix: config.strip_prefix.clone(),
            strip_suffix: config.strip_suffix.clone(),
            id_len: config.id_len,
        }
    }

    pub fn extract(&self, description: &str) -> Extraction {
        if !description.starts_with(&self.tag) {
            return Extraction::Untagged;
        }

        // Prefix and suffix are each removed only when present.
        let candidate = description
            .strip_prefix(self.strip_prefix.as_str())
            .unwrap_or(description);
        let candidate = if self.strip_suffix.is_empty() {
            candidate
        } else {
            candidate
                .strip_suffix(self.strip_suffix.as_str())
                .unwrap_or(candidate)
        };

        if candidate.chars().count() == self.id_len {
            Extraction::Id(candidate.to_string())
        } else {
            Extraction::BadLength(candidate.to_string())
        }
    }
}

impl Default for IdExtractor {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}
