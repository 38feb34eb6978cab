//! Keyword mood classifier
//!
//! Assigns a mood to records that carry no authoritative mood field:
//! community recipes predating the explicit mood column, and every
//! external record (the search API has no mood concept). When upstream
//! supplies a mood it is used as-is and this module is not consulted.

use moodmeals_common::Mood;

const COZY_KEYWORDS: &[&str] = &["soup", "creamy", "bake"];
const RELAXED_KEYWORDS: &[&str] = &["avocado", "smooth"];
const ENERGETIC_KEYWORDS: &[&str] = &["spicy", "noodle", "chili"];

/// Classify a recipe by title and summary text.
///
/// Pure and total: every input maps to exactly one label, identical input
/// yields identical output. The keyword groups are checked in order and
/// the first match wins; the ordering is the tie-break policy ("creamy
/// spicy soup" is Cozy, not Energetic). `Happy` is the catch-all default,
/// not a no-match error.
pub fn classify(title: &str, summary: &str) -> Mood {
    let text = format!("{} {}", title, summary).to_lowercase();

    if contains_any(&text, COZY_KEYWORDS) {
        Mood::Cozy
    } else if contains_any(&text, RELAXED_KEYWORDS) {
        Mood::Relaxed
    } else if contains_any(&text, ENERGETIC_KEYWORDS) {
        Mood::Energetic
    } else {
        Mood::Happy
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
