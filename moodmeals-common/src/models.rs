//! Normalized recipe data model and filter criteria
//!
//! Every source adapter produces `NormalizedRecipe` values; raw upstream
//! shapes never leak past the adapter boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recipe identifier, unique within its source only.
///
/// External ids are numeric, community ids may be strings. A community
/// recipe and an external recipe may share numeric id space, so an id is
/// only meaningful together with its [`SourceKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Int(n) => write!(f, "{}", n),
            RecipeId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecipeId {
    fn from(n: i64) -> Self {
        RecipeId::Int(n)
    }
}

impl From<&str> for RecipeId {
    fn from(s: &str) -> Self {
        RecipeId::Str(s.to_string())
    }
}

impl From<String> for RecipeId {
    fn from(s: String) -> Self {
        RecipeId::Str(s)
    }
}

/// Coarse mood taxonomy used as a filter dimension.
///
/// Serialized as the capitalized label (`"Cozy"`, ...) to match the
/// community catalog's stored mood field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Cozy,
    Relaxed,
    Energetic,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Cozy => "Cozy",
            Mood::Relaxed => "Relaxed",
            Mood::Energetic => "Energetic",
        }
    }

    /// Lenient parse for moods stored upstream (case-insensitive).
    /// Unknown labels yield `None` and the record falls back to
    /// keyword classification.
    pub fn parse(s: &str) -> Option<Mood> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Some(Mood::Happy),
            "cozy" => Some(Mood::Cozy),
            "relaxed" => Some(Mood::Relaxed),
            "energetic" => Some(Mood::Energetic),
            _ => None,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance tag; drives which fields are meaningful downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    External,
    Community,
}

/// Which adapter a discovery query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    External,
    Community,
    Favorites,
}

/// The unified recipe shape every adapter must produce.
///
/// Immutable value object created fresh per fetch. Invariant: `mood` and
/// `source` are always set once a record leaves an adapter; no other field
/// is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecipe {
    pub id: RecipeId,
    pub title: String,
    pub image_url: Option<String>,
    /// Free text used only for classification and the allergy heuristic
    pub summary_text: Option<String>,
    pub mood: Mood,
    /// Present only for the external source, empty otherwise
    pub diet_tags: Vec<String>,
    pub source: SourceKind,
    /// Community-only pass-through; governs visibility outside admin context
    pub approved: Option<bool>,
}

impl NormalizedRecipe {
    /// Lower-cased title + summary, the text the mood classifier and the
    /// allergy filter operate on.
    pub fn searchable_text(&self) -> String {
        let mut text = self.title.to_lowercase();
        if let Some(summary) = &self.summary_text {
            text.push(' ');
            text.push_str(&summary.to_lowercase());
        }
        text
    }
}

/// Reference into the favorites store: id plus provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FavoriteRef {
    #[serde(rename = "recipe_id")]
    pub id: RecipeId,
    #[serde(rename = "source")]
    pub source: SourceKind,
}

/// User-entered filter set.
///
/// `diet` is single-select (selecting a second value replaces the first),
/// `allergy` excludes recipes matching any entry, `mood` includes only
/// recipes matching any entry (empty = no restriction).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub diet: Option<String>,
    pub allergy: Vec<String>,
    pub mood: Vec<Mood>,
    /// Allergies seeded from the user profile; survive `clear()`
    seeded_allergies: Vec<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria pre-seeded with the user's profile allergies. Seeded
    /// allergies are restored (not removed) by [`FilterCriteria::clear`].
    pub fn with_allergies(allergies: Vec<String>) -> Self {
        Self {
            allergy: allergies.clone(),
            seeded_allergies: allergies,
            ..Self::default()
        }
    }

    /// Reset everything the user toggled, keeping profile-seeded allergies.
    pub fn clear(&mut self) {
        self.search.clear();
        self.diet = None;
        self.mood.clear();
        self.allergy = self.seeded_allergies.clone();
    }

    /// Number of active non-search filters, for badge display.
    pub fn active_filter_count(&self) -> usize {
        self.mood.len() + self.allergy.len() + usize::from(self.diet.is_some())
    }
}
