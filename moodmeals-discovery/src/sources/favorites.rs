//! Favorites resolution adapter
//!
//! Resolves a user's favorite references (id + provenance pairs from the
//! favorites store) into normalized recipes via per-item detail fetches.
//! Each partition fans out concurrently and the resolver waits for the
//! whole partition to settle, successes and failures alike. A dangling
//! favorite pointing at a deleted recipe is an expected steady-state
//! condition: its failure is absorbed as a warning, never a fatal error.

use crate::filter;
use crate::sources::{
    CommunityCatalogClient, ExternalSearchClient, Fetched,
};
use futures::future::join_all;
use moodmeals_common::{
    DiscoveryError, FavoriteRef, FilterCriteria, NormalizedRecipe, Result, SourceKind,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One failed favorite resolution. Affects only the result-set size;
/// never surfaced as a user-visible error.
#[derive(Debug)]
pub struct PartialResolutionWarning {
    pub reference: FavoriteRef,
    pub error: DiscoveryError,
}

/// Combined outcome of resolving a favorites list
#[derive(Debug, Default)]
pub struct FavoritesResolution {
    pub recipes: Vec<NormalizedRecipe>,
    pub warnings: Vec<PartialResolutionWarning>,
}

/// Resolves favorite references against both detail services
pub struct FavoritesResolver {
    external: Arc<ExternalSearchClient>,
    community: Arc<CommunityCatalogClient>,
}

impl FavoritesResolver {
    pub fn new(external: Arc<ExternalSearchClient>, community: Arc<CommunityCatalogClient>) -> Self {
        Self { external, community }
    }

    /// Resolve, normalize, and filter the given favorite references.
    ///
    /// No pagination: the result set is bounded by the user's favorite
    /// count. Returns `Fetched::Cancelled` (and nothing else) when the
    /// token fires; individual failures become warnings.
    pub async fn resolve(
        &self,
        criteria: &FilterCriteria,
        refs: &[FavoriteRef],
        cancel: &CancellationToken,
    ) -> Fetched<FavoritesResolution> {
        let (external_refs, community_refs): (Vec<FavoriteRef>, Vec<FavoriteRef>) = refs
            .iter()
            .cloned()
            .partition(|fav| fav.source == SourceKind::External);

        let mut resolution = FavoritesResolution::default();

        // External partition: concurrent per-item detail fetches, gated on
        // the whole partition settling before moving on.
        let settled = join_all(external_refs.into_iter().map(|fav| async move {
            let result = self.external.fetch_detail(&fav.id, cancel).await;
            (fav, result)
        }))
        .await;
        if collect_partition(settled, &mut resolution).is_cancelled() {
            return Fetched::Cancelled;
        }

        // Community partition, same shape.
        let settled = join_all(community_refs.into_iter().map(|fav| async move {
            let result = self.community.fetch_detail(&fav.id, cancel).await;
            (fav, result)
        }))
        .await;
        if collect_partition(settled, &mut resolution).is_cancelled() {
            return Fetched::Cancelled;
        }

        resolution
            .recipes
            .retain(|recipe| filter::matches(recipe, criteria));

        tracing::debug!(
            resolved = resolution.recipes.len(),
            failed = resolution.warnings.len(),
            "Favorites resolved"
        );

        Fetched::Complete(resolution)
    }
}

/// Fold one settled partition into the resolution. Failures are logged and
/// kept as warnings; any cancelled item means the whole call was
/// superseded.
fn collect_partition(
    settled: Vec<(FavoriteRef, Result<Fetched<NormalizedRecipe>>)>,
    resolution: &mut FavoritesResolution,
) -> Fetched<()> {
    for (reference, result) in settled {
        match result {
            Ok(Fetched::Complete(recipe)) => resolution.recipes.push(recipe),
            Ok(Fetched::Cancelled) => return Fetched::Cancelled,
            Err(error) => {
                tracing::warn!(
                    recipe_id = %reference.id,
                    source = ?reference.source,
                    error = %error,
                    "Favorite resolution failed (non-fatal, dropping reference)"
                );
                resolution.warnings.push(PartialResolutionWarning { reference, error });
            }
        }
    }
    Fetched::Complete(())
}
