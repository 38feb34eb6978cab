//! External search adapter
//!
//! Client for the third-party recipe search service (Spoonacular-shaped
//! API). Search text, one diet value, and the comma-joined intolerance
//! list are delegated to upstream query parameters; the full filter
//! predicate is still re-applied client-side afterwards, because mood has
//! no upstream equivalent and our allergy substring matching is stricter
//! than upstream intolerance matching.

use crate::filter;
use crate::mood;
use crate::sources::{check_status, transport_error, Fetched};
use moodmeals_common::config::DiscoveryConfig;
use moodmeals_common::{
    DiscoveryError, FilterCriteria, NormalizedRecipe, RecipeId, Result, SourceKind,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Minimum interval between upstream requests (free-tier quota protection)
const RATE_LIMIT_MS: u64 = 100;

/// Raw search-page record as returned by `GET /recipes/complexSearch`
#[derive(Debug, Clone, Deserialize)]
struct RawExternalRecipe {
    id: i64,
    title: String,
    image: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    diets: Vec<String>,
}

impl RawExternalRecipe {
    /// External records never carry an authoritative mood, so every one is
    /// classified here.
    fn normalize(self) -> NormalizedRecipe {
        let mood = mood::classify(&self.title, self.summary.as_deref().unwrap_or(""));
        NormalizedRecipe {
            id: RecipeId::Int(self.id),
            title: self.title,
            image_url: self.image,
            summary_text: self.summary,
            mood,
            diet_tags: self.diets,
            source: SourceKind::External,
            approved: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<RawExternalRecipe>,
    #[serde(rename = "totalResults")]
    total_results: u64,
}

/// One fetched and locally filtered page of external results
#[derive(Debug)]
pub struct ExternalPage {
    /// Normalized records that survived the client-side filter pass
    pub recipes: Vec<NormalizedRecipe>,
    /// Raw record count upstream returned for this page, before local
    /// filtering. Pagination exhaustion is judged on this, not on
    /// `recipes.len()`, so a heavily filtered page does not end the scroll.
    pub upstream_count: usize,
    /// Upstream's total-count field for the delegated query
    pub total_available: u64,
}

/// Rate limiter enforcing a minimum interval between upstream requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// External recipe search client
pub struct ExternalSearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: Arc<RateLimiter>,
}

impl ExternalSearchClient {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DiscoveryError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.external_base_url.trim_end_matches('/').to_string(),
            api_key: config.external_api_key.clone(),
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }

    /// Fetch one page of search results, normalize, classify, and filter.
    ///
    /// Honors `cancel`: a superseded call aborts the in-flight request and
    /// resolves to `Fetched::Cancelled` with no partial state.
    pub async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        offset: u32,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Fetched<ExternalPage>> {
        self.rate_limiter.wait().await;

        if cancel.is_cancelled() {
            return Ok(Fetched::Cancelled);
        }

        let url = format!("{}/recipes/complexSearch", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("apiKey", self.api_key.clone()),
            ("number", limit.to_string()),
            ("offset", offset.to_string()),
            ("addRecipeInformation", "true".to_string()),
        ];
        if !criteria.search.is_empty() {
            params.push(("query", criteria.search.clone()));
        }
        // Upstream accepts a single diet value
        if let Some(diet) = &criteria.diet {
            params.push(("diet", diet.to_lowercase()));
        }
        if !criteria.allergy.is_empty() {
            params.push(("intolerances", criteria.allergy.join(",").to_lowercase()));
        }

        tracing::debug!(offset, limit, query = %criteria.search, "Querying external search API");

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(offset, "External search cancelled in flight");
                return Ok(Fetched::Cancelled);
            }
            res = self.http.get(&url).query(&params).send() => res.map_err(transport_error)?,
        };

        let response = check_status(response).await?;

        let body: SearchResponse = tokio::select! {
            _ = cancel.cancelled() => return Ok(Fetched::Cancelled),
            body = response.json() => body.map_err(transport_error)?,
        };

        let upstream_count = body.results.len();
        let total_available = body.total_results;

        let recipes: Vec<NormalizedRecipe> = body
            .results
            .into_iter()
            .map(RawExternalRecipe::normalize)
            .filter(|recipe| filter::matches(recipe, criteria))
            .collect();

        tracing::debug!(
            upstream_count,
            kept = recipes.len(),
            total_available,
            "External page fetched and filtered"
        );

        Ok(Fetched::Complete(ExternalPage {
            recipes,
            upstream_count,
            total_available,
        }))
    }

    /// Resolve one recipe by id via the detail endpoint.
    ///
    /// Used by favorites resolution; returns the normalized record without
    /// applying the filter predicate (the resolver filters the combined
    /// set).
    pub async fn fetch_detail(
        &self,
        id: &RecipeId,
        cancel: &CancellationToken,
    ) -> Result<Fetched<NormalizedRecipe>> {
        self.rate_limiter.wait().await;

        if cancel.is_cancelled() {
            return Ok(Fetched::Cancelled);
        }

        let url = format!("{}/recipes/{}/information", self.base_url, id);
        let params = [("apiKey", self.api_key.as_str())];

        let response = tokio::select! {
            _ = cancel.cancelled() => return Ok(Fetched::Cancelled),
            res = self.http.get(&url).query(&params).send() => res.map_err(transport_error)?,
        };

        let response = check_status(response).await?;

        let raw: RawExternalRecipe = tokio::select! {
            _ = cancel.cancelled() => return Ok(Fetched::Cancelled),
            body = response.json() => body.map_err(transport_error)?,
        };

        Ok(Fetched::Complete(raw.normalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodmeals_common::Mood;

    #[test]
    fn normalize_classifies_and_tags_provenance() {
        let raw = RawExternalRecipe {
            id: 716429,
            title: "Creamy Tomato Soup".to_string(),
            image: Some("https://img.example/716429.jpg".to_string()),
            summary: None,
            diets: vec!["vegetarian".to_string()],
        };

        let recipe = raw.normalize();
        assert_eq!(recipe.id, RecipeId::Int(716429));
        assert_eq!(recipe.mood, Mood::Cozy);
        assert_eq!(recipe.source, SourceKind::External);
        assert_eq!(recipe.diet_tags, vec!["vegetarian".to_string()]);
        assert_eq!(recipe.approved, None);
    }

    #[test]
    fn search_response_tolerates_missing_optional_fields() {
        let json = r#"{
            "results": [{"id": 1, "title": "Plain Rice"}],
            "totalResults": 1
        }"#;
        let body: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.results.len(), 1);
        assert!(body.results[0].diets.is_empty());
        assert_eq!(body.total_results, 1);
    }

    #[tokio::test]
    async fn rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(50);

        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(45));
    }
}
