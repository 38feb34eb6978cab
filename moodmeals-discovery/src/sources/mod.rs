//! Source adapters
//!
//! One adapter per upstream: the external search API, the community
//! catalog, and favorite resolution (fan-out over both detail services).
//! Every adapter normalizes raw upstream shapes into `NormalizedRecipe`
//! at its boundary, attaches a mood, and applies the full filter
//! predicate. Raw wire shapes never escape this module.

pub mod community;
pub mod external;
pub mod favorites;

pub use community::CommunityCatalogClient;
pub use external::{ExternalPage, ExternalSearchClient};
pub use favorites::{FavoritesResolution, FavoritesResolver, PartialResolutionWarning};

use moodmeals_common::{DiscoveryError, Result};

/// Outcome of a cancellable fetch.
///
/// Cancellation is not an error: a superseded call resolves to
/// `Cancelled`, writes no state, and surfaces nothing to the user.
#[derive(Debug)]
pub enum Fetched<T> {
    Complete(T),
    Cancelled,
}

impl<T> Fetched<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Fetched::Cancelled)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Complete(value) => Some(value),
            Fetched::Cancelled => None,
        }
    }
}

/// Map a reqwest failure onto the discovery taxonomy. Non-2xx statuses are
/// handled separately in [`check_status`] so the response body can be
/// carried in the error message.
pub(crate) fn transport_error(err: reqwest::Error) -> DiscoveryError {
    if err.is_builder() || err.is_request() {
        DiscoveryError::Request(err.to_string())
    } else if err.is_decode() {
        DiscoveryError::Parse(err.to_string())
    } else {
        DiscoveryError::Network(err.to_string())
    }
}

/// Reject non-success responses as `Upstream`, carrying status and body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(DiscoveryError::Upstream {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}
