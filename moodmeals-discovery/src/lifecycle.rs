//! Request lifecycle manager
//!
//! [`DiscoveryEngine`] is the single type the presentation layer calls.
//! It owns the source adapters, the pagination controller, and the
//! generation machinery that makes rapid input changes race-free:
//!
//! - every `query` starts a new generation and cancels the superseded
//!   generation's token before issuing the fetch;
//! - results are committed only if their generation is still current when
//!   the fetch completes, so the last-issued (not last-completed) request
//!   wins and a slow stale response can never clobber a newer one;
//! - free-text search changes are coalesced behind a quiet-period timer
//!   before dispatching, decoupling keystroke cadence from network calls;
//! - at most one error surfaces per generation; cancellation surfaces
//!   nothing.
//!
//! Known limitation: there is no timeout layer beyond the transport's
//! request timeout. A hung request is resolved only by a superseding
//! query.

use crate::pagination::{PageInfo, PaginationController};
use crate::sources::{
    CommunityCatalogClient, ExternalSearchClient, FavoritesResolver, Fetched,
    PartialResolutionWarning,
};
use moodmeals_common::config::DiscoveryConfig;
use moodmeals_common::{FavoriteRef, FilterCriteria, NormalizedRecipe, Result, SourceMode};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// What a query call produced for the presentation layer.
#[derive(Debug)]
pub enum QueryOutcome {
    /// Fresh results for the current generation. `page` is populated for
    /// the external source only; `recipes` is the full accumulated list
    /// there, so infinite scroll renders from this alone.
    Completed {
        recipes: Vec<NormalizedRecipe>,
        page: Option<PageInfo>,
        /// Non-fatal favorite-resolution failures (favorites mode only)
        warnings: Vec<PartialResolutionWarning>,
    },
    /// A newer generation superseded this call (or a newer keystroke
    /// coalesced this search); render nothing.
    Superseded,
    /// Load-more rejected: a load is already in flight or the result set
    /// is exhausted. No-op, not queued.
    Skipped,
}

struct EngineState {
    generation: u64,
    cancel: CancellationToken,
    criteria: FilterCriteria,
    mode: SourceMode,
    favorite_refs: Vec<FavoriteRef>,
    /// Monotonic keystroke counter for debounce coalescing
    search_seq: u64,
    pagination: PaginationController,
}

/// Session-scoped discovery engine; one instance per browsing session.
pub struct DiscoveryEngine {
    session_id: Uuid,
    config: DiscoveryConfig,
    external: Arc<ExternalSearchClient>,
    community: Arc<CommunityCatalogClient>,
    favorites: FavoritesResolver,
    state: Mutex<EngineState>,
    /// Parent of every generation token; fired on teardown
    shutdown: CancellationToken,
}

impl DiscoveryEngine {
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        let external = Arc::new(ExternalSearchClient::new(&config)?);
        let community = Arc::new(CommunityCatalogClient::new(&config)?);
        let favorites = FavoritesResolver::new(external.clone(), community.clone());
        let shutdown = CancellationToken::new();

        Ok(Self {
            session_id: Uuid::new_v4(),
            state: Mutex::new(EngineState {
                generation: 0,
                cancel: shutdown.child_token(),
                criteria: FilterCriteria::new(),
                mode: SourceMode::External,
                favorite_refs: Vec::new(),
                search_seq: 0,
                pagination: PaginationController::new(config.page_size),
            }),
            config,
            external,
            community,
            favorites,
            shutdown,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Latest criteria this session queried with.
    pub fn criteria(&self) -> FilterCriteria {
        self.state.lock().unwrap().criteria.clone()
    }

    /// Pagination metadata for the current external session.
    pub fn page_info(&self) -> PageInfo {
        self.state.lock().unwrap().pagination.page_info()
    }

    /// Current favorite references, as last pushed by the favorites store.
    pub fn set_favorite_refs(&self, refs: Vec<FavoriteRef>) {
        self.state.lock().unwrap().favorite_refs = refs;
    }

    /// Cancel all in-flight work; the engine is being torn down.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Run a query for a new filter-criteria generation.
    ///
    /// Cancels any superseded in-flight fetch first, discards pagination
    /// state, and fetches from the selected source. Retrying after an
    /// error is simply calling this again with the same arguments.
    pub async fn query(
        &self,
        criteria: FilterCriteria,
        mode: SourceMode,
    ) -> Result<QueryOutcome> {
        let (generation, cancel, refs) = {
            let mut state = self.state.lock().unwrap();
            // Supersede: the old generation's token dies before the new
            // fetch is issued.
            state.cancel.cancel();
            state.generation += 1;
            state.cancel = self.shutdown.child_token();
            state.criteria = criteria.clone();
            state.mode = mode;
            state.pagination.reset();
            if mode == SourceMode::External {
                // Fresh state; begin_load always yields offset 0 here
                let _ = state.pagination.begin_load();
            }
            (
                state.generation,
                state.cancel.clone(),
                state.favorite_refs.clone(),
            )
        };

        tracing::debug!(
            session_id = %self.session_id,
            generation,
            mode = ?mode,
            "Starting query generation"
        );

        match mode {
            SourceMode::External => self.run_external_page(generation, &criteria, 0, cancel).await,
            SourceMode::Community => self.run_community(generation, &criteria, cancel).await,
            SourceMode::Favorites => {
                self.run_favorites(generation, &criteria, refs, cancel).await
            }
        }
    }

    /// Fetch the next external page for the current generation.
    ///
    /// A call while another load is in flight is rejected (`Skipped`), not
    /// queued. A criteria change issued mid-load supersedes the load.
    pub async fn load_more(&self) -> Result<QueryOutcome> {
        let (generation, criteria, cancel, offset) = {
            let mut state = self.state.lock().unwrap();
            if state.mode != SourceMode::External {
                return Ok(QueryOutcome::Skipped);
            }
            let Some(offset) = state.pagination.begin_load() else {
                tracing::debug!(
                    session_id = %self.session_id,
                    in_flight = state.pagination.is_loading(),
                    "Load-more rejected"
                );
                return Ok(QueryOutcome::Skipped);
            };
            (
                state.generation,
                state.criteria.clone(),
                state.cancel.clone(),
                offset,
            )
        };

        self.run_external_page(generation, &criteria, offset, cancel)
            .await
    }

    /// Coalesce a free-text search change behind the configured quiet
    /// period, then dispatch it as a new query. Only the last keystroke
    /// within the window reaches the network.
    pub async fn debounced_search(&self, text: impl Into<String>) -> Result<QueryOutcome> {
        let text = text.into();
        let my_seq = {
            let mut state = self.state.lock().unwrap();
            state.search_seq += 1;
            state.search_seq
        };

        tokio::time::sleep(self.config.search_debounce()).await;

        let (criteria, mode) = {
            let state = self.state.lock().unwrap();
            if state.search_seq != my_seq {
                // A newer keystroke owns the quiet period now
                return Ok(QueryOutcome::Superseded);
            }
            let mut criteria = state.criteria.clone();
            criteria.search = text;
            (criteria, state.mode)
        };

        self.query(criteria, mode).await
    }

    async fn run_external_page(
        &self,
        generation: u64,
        criteria: &FilterCriteria,
        offset: u32,
        cancel: CancellationToken,
    ) -> Result<QueryOutcome> {
        let fetch = self
            .external
            .fetch_page(criteria, offset, self.config.page_size, &cancel)
            .await;

        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            tracing::debug!(
                session_id = %self.session_id,
                generation,
                current = state.generation,
                "Discarding stale external result"
            );
            return Ok(QueryOutcome::Superseded);
        }

        match fetch {
            Ok(Fetched::Complete(page)) => {
                let info = state.pagination.commit_page(page);
                Ok(QueryOutcome::Completed {
                    recipes: state.pagination.recipes().to_vec(),
                    page: Some(info),
                    warnings: Vec::new(),
                })
            }
            Ok(Fetched::Cancelled) => Ok(QueryOutcome::Superseded),
            Err(error) => {
                state.pagination.abort_load();
                Err(error)
            }
        }
    }

    async fn run_community(
        &self,
        generation: u64,
        criteria: &FilterCriteria,
        cancel: CancellationToken,
    ) -> Result<QueryOutcome> {
        let fetch = self.community.fetch_all(criteria, &cancel).await;

        let state = self.state.lock().unwrap();
        if state.generation != generation {
            return Ok(QueryOutcome::Superseded);
        }

        match fetch {
            Ok(Fetched::Complete(recipes)) => Ok(QueryOutcome::Completed {
                recipes,
                page: None,
                warnings: Vec::new(),
            }),
            Ok(Fetched::Cancelled) => Ok(QueryOutcome::Superseded),
            Err(error) => Err(error),
        }
    }

    async fn run_favorites(
        &self,
        generation: u64,
        criteria: &FilterCriteria,
        refs: Vec<FavoriteRef>,
        cancel: CancellationToken,
    ) -> Result<QueryOutcome> {
        let fetch = self.favorites.resolve(criteria, &refs, &cancel).await;

        let state = self.state.lock().unwrap();
        if state.generation != generation {
            return Ok(QueryOutcome::Superseded);
        }

        match fetch {
            Fetched::Complete(resolution) => Ok(QueryOutcome::Completed {
                recipes: resolution.recipes,
                page: None,
                warnings: resolution.warnings,
            }),
            Fetched::Cancelled => Ok(QueryOutcome::Superseded),
        }
    }
}

impl Drop for DiscoveryEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
