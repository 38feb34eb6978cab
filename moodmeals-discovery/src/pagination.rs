//! Pagination controller for the external source
//!
//! Session-scoped state machine over accumulated external results:
//! `Idle -> Loading(page 1) -> Ready(has_more) -> LoadingMore -> Ready`.
//! Any criteria change discards the state (`reset`) and starts over at
//! page 1. Community and favorites sources are always whole-result and
//! never touch this controller.
//!
//! The accumulated list is mutated only here, and only after the caller
//! has confirmed the fetch is not stale.

use crate::sources::ExternalPage;
use moodmeals_common::{NormalizedRecipe, RecipeId};
use std::collections::HashSet;

/// Pagination metadata handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Index of the most recently committed page (first page = 1)
    pub page_index: u32,
    /// Recipes accumulated so far (post-filter)
    pub loaded: usize,
    pub has_more: bool,
    /// Upstream's total count, unknown before the first page commits
    pub total_known: Option<u64>,
}

/// Owns `PaginationState` for one browsing session.
pub struct PaginationController {
    page_size: u32,
    /// Pages committed so far; 0 while idle
    page_index: u32,
    accumulated: Vec<NormalizedRecipe>,
    /// Ids already accumulated this session; guards against duplicates
    seen: HashSet<RecipeId>,
    /// Raw upstream records consumed so far (pre-filter), compared
    /// against `total_known` for exhaustion
    upstream_seen: u64,
    has_more: bool,
    total_known: Option<u64>,
    /// Load-more mutex: a second concurrent load is a no-op, not a queue
    in_flight: bool,
}

impl PaginationController {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            page_index: 0,
            accumulated: Vec::new(),
            seen: HashSet::new(),
            upstream_seen: 0,
            has_more: true,
            total_known: None,
            in_flight: false,
        }
    }

    /// Discard all session state; called on every criteria change.
    pub fn reset(&mut self) {
        *self = Self::new(self.page_size);
    }

    pub fn recipes(&self) -> &[NormalizedRecipe] {
        &self.accumulated
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            page_index: self.page_index,
            loaded: self.accumulated.len(),
            has_more: self.has_more,
            total_known: self.total_known,
        }
    }

    /// Begin loading the next page. Returns the upstream offset to fetch,
    /// or `None` when the load is rejected: a load is already in flight
    /// (mutex, not a queue) or the result set is exhausted.
    pub fn begin_load(&mut self) -> Option<u32> {
        if self.in_flight || !self.has_more {
            return None;
        }
        self.in_flight = true;
        Some(self.page_index * self.page_size)
    }

    /// Abandon an in-flight load (fetch failed or was superseded while the
    /// controller itself survived).
    pub fn abort_load(&mut self) {
        self.in_flight = false;
    }

    /// Commit a confirmed-fresh page: grow the accumulated list and settle
    /// exhaustion.
    ///
    /// Exhaustion is judged on the raw upstream batch size, not the
    /// filtered size: a short upstream page means the source ran out, a
    /// heavily filtered full page does not.
    pub fn commit_page(&mut self, page: ExternalPage) -> PageInfo {
        debug_assert!(self.in_flight, "commit_page without begin_load");

        self.page_index += 1;
        self.upstream_seen += page.upstream_count as u64;
        self.total_known = Some(page.total_available);

        for recipe in page.recipes {
            if self.seen.insert(recipe.id.clone()) {
                self.accumulated.push(recipe);
            }
        }

        self.has_more = page.upstream_count as u32 >= self.page_size
            && self.upstream_seen < page.total_available;
        self.in_flight = false;

        tracing::debug!(
            page_index = self.page_index,
            loaded = self.accumulated.len(),
            has_more = self.has_more,
            "Page committed"
        );

        self.page_info()
    }
}
