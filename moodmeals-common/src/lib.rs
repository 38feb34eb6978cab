//! # Mood Meals Common Library
//!
//! Shared code for the Mood Meals recipe discovery engine:
//! - Normalized recipe data model and filter criteria
//! - Error taxonomy for upstream fetches
//! - Configuration loading

pub mod config;
pub mod error;
pub mod models;

pub use error::{DiscoveryError, Result};
pub use models::{
    FavoriteRef, FilterCriteria, Mood, NormalizedRecipe, RecipeId, SourceKind, SourceMode,
};
