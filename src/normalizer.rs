//! # Narrative Normalizer Module
//!
//! ## Purpose
//! Converts raw incident narratives, with their administrative framing (dates,
//! times, salutation lines, stock reporting phrases), into a cleaned,
//! keyword-annotated query string suitable for embedding.
//!
//! ## Input/Output Specification
//! - **Input**: Raw narrative text, any length, any casing
//! - **Output**: `NormalizedQuery` with cleaned text and matched crime-category keywords
//! - **Guarantee**: Never fails; empty input yields an empty query
//!
//! ## Key Features
//! - Case-insensitive keyword detection against the full raw text
//! - Date/time token and boilerplate phrase stripping in a fixed order
//! - Keyword-weighted composite query construction for embedding
//! - Unicode NFC normalization and whitespace collapsing

use crate::keywords::KeywordCatalog;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Administrative boilerplate phrases removed from narratives
const NOISE_PHRASES: &[&str] = &[
    "to the station house officer",
    "subject:",
    "respected sir",
    "i am writing to report",
    "located at",
    "a case has been registered",
];

/// Normalizer for raw incident narratives
pub struct Normalizer {
    catalog: KeywordCatalog,
    date_pattern: Regex,
    time_pattern: Regex,
    noise_patterns: Vec<Regex>,
    whitespace_pattern: Regex,
}

/// Result of normalizing one narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuery {
    /// Narrative with administrative noise stripped, original casing preserved
    pub cleaned_text: String,
    /// Catalog entries found in the raw text, deduplicated and in catalog order
    pub matched_keywords: Vec<String>,
}

impl NormalizedQuery {
    /// Query text handed to the embedding provider. When keywords matched,
    /// they are prefixed as an explicit category preamble so the embedding is
    /// steered toward the matched legal category even when the narrative
    /// phrasing is oblique.
    pub fn composite_text(&self) -> String {
        if self.matched_keywords.is_empty() {
            self.cleaned_text.clone()
        } else {
            format!(
                "Crime Categories: {}. Context: {}",
                self.matched_keywords.join(", "),
                self.cleaned_text
            )
        }
    }
}

impl Normalizer {
    /// Create a normalizer over the given keyword catalog
    pub fn new(catalog: KeywordCatalog) -> Self {
        let noise_patterns = NOISE_PHRASES
            .iter()
            .map(|phrase| {
                let escaped = regex::escape(phrase);
                Regex::new(&format!("(?i){}", escaped)).expect("static noise phrase pattern")
            })
            .collect();

        Self {
            catalog,
            date_pattern: Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}")
                .expect("static date pattern"),
            time_pattern: Regex::new(r"\d{1,2}:\d{2}\s*(?:[AaPp][Mm])?")
                .expect("static time pattern"),
            noise_patterns,
            whitespace_pattern: Regex::new(r"\s+").expect("static whitespace pattern"),
        }
    }

    /// Normalize a raw narrative. Infallible: empty input yields an empty
    /// cleaned text and no matched keywords.
    pub fn normalize(&self, raw_text: &str) -> NormalizedQuery {
        let text: String = raw_text.nfc().collect();

        // Keyword detection runs against the full raw text, never the
        // stripped text.
        let matched_keywords = self.catalog.matches_in(&text.to_lowercase());

        let cleaned_text = self.strip_noise(&text);

        NormalizedQuery {
            cleaned_text,
            matched_keywords,
        }
    }

    /// Remove date tokens, time tokens, and boilerplate phrases, then collapse
    /// whitespace. Applied in this order; later patterns may match substrings
    /// exposed by earlier removals.
    fn strip_noise(&self, text: &str) -> String {
        let mut cleaned = self.date_pattern.replace_all(text, "").into_owned();
        cleaned = self.time_pattern.replace_all(&cleaned, "").into_owned();

        for pattern in &self.noise_patterns {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }

        self.whitespace_pattern
            .replace_all(&cleaned, " ")
            .trim()
            .to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(KeywordCatalog::default())
    }
}
