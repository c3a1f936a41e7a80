//! Tag grammar: a fixed vendor prefix followed by a run of hexadecimal digits.
//!
//! Matching is always against the whole candidate. A string that merely
//! contains a valid tag somewhere inside it is not a tag.

use regex::Regex;

use crate::config::GrammarConfig;
use crate::error::ReconError;
use crate::model::TagId;

/// Compiled tag grammar. Built once per run and shared by reference.
#[derive(Debug, Clone)]
pub struct TagGrammar {
    prefix: String,
    suffix_len: usize,
    pattern: Regex,
}

impl TagGrammar {
    pub fn new(prefix: &str, suffix_len: usize) -> Result<Self, ReconError> {
        let prefix = prefix.to_ascii_uppercase();
        let pattern = Regex::new(&format!(
            "^{}[0-9A-F]{{{}}}$",
            regex::escape(&prefix),
            suffix_len
        ))
        .map_err(|e| ReconError::Grammar(e.to_string()))?;

        Ok(Self {
            prefix,
            suffix_len,
            pattern,
        })
    }

    pub fn from_config(config: &GrammarConfig) -> Result<Self, ReconError> {
        Self::new(&config.prefix, config.suffix_len)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Total length of a valid tag.
    pub fn tag_len(&self) -> usize {
        self.prefix.len() + self.suffix_len
    }

    /// True when `candidate`, ignoring ASCII case, is exactly one tag.
    pub fn matches(&self, candidate: &str) -> bool {
        // Cheap reject before allocating the uppercase copy.
        if candidate.len() != self.tag_len() {
            return false;
        }
        self.pattern.is_match(&candidate.to_ascii_uppercase())
    }

    /// Canonical (uppercase) tag for `candidate`, if it matches.
    pub fn parse(&self, candidate: &str) -> Option<TagId> {
        if !self.matches(candidate) {
            return None;
        }
        Some(TagId::new_unchecked(candidate.to_ascii_uppercase()))
    }
}
