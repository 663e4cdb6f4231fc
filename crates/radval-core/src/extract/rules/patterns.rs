//! Regex patterns for report field extraction.
//!
//! All patterns expect text already passed through [`super::normalize`]:
//! lowercase, with hyphens and underscores turned into spaces.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Laterality, whole words only ("leftover" is not "left")
    pub static ref LEFT: Regex = Regex::new(r"\bleft\b").unwrap();

    pub static ref RIGHT: Regex = Regex::new(r"\bright\b").unwrap();

    // Size: first number directly followed by "mm"
    pub static ref SIZE_MM: Regex = Regex::new(
        r"([0-9]+(?:\.[0-9]+)?)\s*mm"
    ).unwrap();

    // Calcifications
    pub static ref CALCIFICATION_NEGATION: Regex = Regex::new(
        r"no\s+(?:suspicious\s+)?micro\s?calcifications|no\s+calcifications"
    ).unwrap();

    pub static ref CALCIFICATION_MENTION: Regex = Regex::new(
        r"micro\s?calcifications|calcifications"
    ).unwrap();

    // "no suspicious ...", capturing a calcification noun when it follows
    pub static ref NO_SUSPICIOUS: Regex = Regex::new(
        r"no\s+suspicious(?:\s+(micro\s?calcifications|calcifications))?"
    ).unwrap();
}

/// Phrases that classify a report as negative.
pub const NEGATIVE_PHRASES: [&str; 1] = ["birads 1"];

/// Words that indicate a focal finding.
pub const MASS_WORDS: [&str; 3] = ["mass", "lesion", "focus"];

/// Literal marker that downgrades calcifications to non-suspicious.
pub const BENIGN: &str = "benign";
