//! # Mood Meals Discovery Engine
//!
//! Fetches recipes from heterogeneous sources (third-party search API,
//! internal community catalog, favorite resolution), normalizes them into
//! one shape, applies the shared filter set, classifies records into the
//! mood taxonomy, and drives incremental pagination with race-free
//! cancellation of superseded requests.
//!
//! The presentation layer talks to exactly one type: [`DiscoveryEngine`].
//!
//! ## Allergy filter caveat
//!
//! The allergy filter is a textual heuristic over title/summary, not an
//! ingredient-level guarantee. An allergen present in a recipe but not
//! mentioned in its text will NOT be filtered out. Any surface exposing
//! this filter must disclose that to the end user.

pub mod filter;
pub mod lifecycle;
pub mod mood;
pub mod pagination;
pub mod sources;

pub use lifecycle::{DiscoveryEngine, QueryOutcome};
pub use pagination::{PageInfo, PaginationController};
pub use sources::{Fetched, PartialResolutionWarning};
