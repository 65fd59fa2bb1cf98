//! # VCF Slug Color Extraction
//!
//! This crate parses free-text vehicle slugs (and other keyword-ish text such
//! as an `additionalInfo` blurb) into ordered, deduplicated exterior and
//! interior color-term lists. It is the single home of the segment-splitting
//! and adjacency heuristics; the attribute normalizer invokes it and no other
//! layer reimplements it.
//!
//! ## Heuristic, not a grammar
//!
//! The input is lower-cased and `-`/`_` separators become spaces. If the
//! marker word `inside` occurs, text before it is the *exterior segment* and
//! text after it the *interior segment*; otherwise everything is exterior. A
//! vocabulary term counts as exterior when adjacent to an exterior marker
//! (`body`, `roof`, `pearl`, `metallic`), or, when no interior segment
//! exists, anywhere in the exterior segment as long as no interior marker
//! word sits next to it. A term counts as interior when it occurs anywhere in
//! the interior segment; the conjunction `and` may bracket it freely.
//!
//! Absence of a recognized color never is an error: the result is simply an
//! empty list, and downstream filtering treats an empty color set as
//! "unknown", not "colorless".
//!
//! ## Example
//!
//! ```
//! use vcf_slug::{extract, SlugConfig};
//!
//! let colors = extract("white-body-pearl-inside-black-and-red", &SlugConfig::default())
//!     .expect("default config is valid");
//!
//! assert_eq!(colors.exterior, vec!["white"]);
//! assert_eq!(colors.interior, vec!["black", "red"]);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;
pub mod vocab;

pub use config::SlugConfig;

/// Errors that can occur during slug color extraction.
///
/// Extraction itself is total; only a broken configuration fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Ordered, deduplicated color terms extracted from one piece of text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlugColors {
    /// Exterior color terms, first occurrence first.
    pub exterior: Vec<String>,
    /// Interior color terms, first occurrence first.
    pub interior: Vec<String>,
}

impl SlugColors {
    /// True when neither segment produced a color term.
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty() && self.interior.is_empty()
    }
}

/// Extract exterior and interior color terms from a slug.
pub fn extract(slug: &str, cfg: &SlugConfig) -> Result<SlugColors, SlugError> {
    cfg.validate()?;

    let words = segment_words(slug);
    let split = words.iter().position(|w| *w == cfg.segment_marker);
    let (exterior_words, interior_words) = match split {
        Some(idx) => (&words[..idx], &words[idx + 1..]),
        None => (&words[..], &[][..]),
    };
    let has_interior_segment = split.is_some();

    let mut colors = SlugColors::default();

    for (idx, word) in exterior_words.iter().enumerate() {
        if !is_color_term(word, cfg) {
            continue;
        }
        let next_to_exterior_marker = adjacent_to(exterior_words, idx, &cfg.exterior_markers);
        let next_to_interior_marker = adjacent_to(exterior_words, idx, &cfg.interior_markers);
        // With an interior segment present only explicit marker adjacency is
        // trusted; without one, any non-interior-marked occurrence counts.
        if next_to_exterior_marker || (!has_interior_segment && !next_to_interior_marker) {
            push_unique(&mut colors.exterior, word);
        }
    }

    for word in interior_words {
        if is_color_term(word, cfg) {
            push_unique(&mut colors.interior, word);
        }
    }

    Ok(colors)
}

/// Lower-cases text and splits it into words, treating `-`, `_`, and
/// whitespace as separators. Empty segments are dropped.
pub fn segment_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn is_color_term(word: &str, cfg: &SlugConfig) -> bool {
    cfg.vocabulary.iter().any(|term| term == word)
}

fn adjacent_to(words: &[String], idx: usize, markers: &[String]) -> bool {
    let matches_marker = |w: &String| markers.iter().any(|m| m == w);
    if idx > 0 && matches_marker(&words[idx - 1]) {
        return true;
    }
    matches!(words.get(idx + 1), Some(next) if matches_marker(next))
}

fn push_unique(list: &mut Vec<String>, word: &str) {
    if !list.iter().any(|existing| existing == word) {
        list.push(word.to_string());
    }
}
