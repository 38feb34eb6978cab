//! Community list adapter
//!
//! The community catalog has no native filtering or pagination; the
//! complete result set is small enough to fetch in one call and filter
//! client-side. Records may carry an authoritative mood (set by their
//! author); only records lacking one go through the keyword classifier.

use crate::filter;
use crate::mood;
use crate::sources::{check_status, transport_error, Fetched};
use moodmeals_common::config::DiscoveryConfig;
use moodmeals_common::{
    DiscoveryError, FilterCriteria, Mood, NormalizedRecipe, RecipeId, Result, SourceKind,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Raw community catalog record
#[derive(Debug, Clone, Deserialize)]
struct RawCommunityRecipe {
    id: RecipeId,
    title: String,
    image_url: Option<String>,
    summary: Option<String>,
    /// Authoritative mood set by the recipe author; legacy records lack it
    mood: Option<String>,
    approved: Option<bool>,
}

impl RawCommunityRecipe {
    fn normalize(self) -> NormalizedRecipe {
        // Authoritative mood wins; classify only when absent or unparseable
        let mood = self
            .mood
            .as_deref()
            .and_then(Mood::parse)
            .unwrap_or_else(|| {
                mood::classify(&self.title, self.summary.as_deref().unwrap_or(""))
            });

        NormalizedRecipe {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            summary_text: self.summary,
            mood,
            diet_tags: Vec::new(),
            source: SourceKind::Community,
            approved: self.approved,
        }
    }

    /// Records rejected by moderation are invisible outside admin views.
    /// Legacy records without the flag remain visible.
    fn is_visible(&self) -> bool {
        self.approved != Some(false)
    }
}

/// Community catalog client
pub struct CommunityCatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CommunityCatalogClient {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DiscoveryError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.community_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the full catalog, normalize, and filter client-side.
    pub async fn fetch_all(
        &self,
        criteria: &FilterCriteria,
        cancel: &CancellationToken,
    ) -> Result<Fetched<Vec<NormalizedRecipe>>> {
        if cancel.is_cancelled() {
            return Ok(Fetched::Cancelled);
        }

        let url = format!("{}/community", self.base_url);
        tracing::debug!(url = %url, "Fetching community catalog");

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Community fetch cancelled in flight");
                return Ok(Fetched::Cancelled);
            }
            res = self.http.get(&url).send() => res.map_err(transport_error)?,
        };

        let response = check_status(response).await?;

        let raw: Vec<RawCommunityRecipe> = tokio::select! {
            _ = cancel.cancelled() => return Ok(Fetched::Cancelled),
            body = response.json() => body.map_err(transport_error)?,
        };

        let fetched = raw.len();
        let recipes: Vec<NormalizedRecipe> = raw
            .into_iter()
            .filter(RawCommunityRecipe::is_visible)
            .map(RawCommunityRecipe::normalize)
            .filter(|recipe| filter::matches(recipe, criteria))
            .collect();

        tracing::debug!(fetched, kept = recipes.len(), "Community catalog filtered");

        Ok(Fetched::Complete(recipes))
    }

    /// Resolve one community recipe by id (favorites resolution). The
    /// filter predicate is applied by the caller on the combined set.
    pub async fn fetch_detail(
        &self,
        id: &RecipeId,
        cancel: &CancellationToken,
    ) -> Result<Fetched<NormalizedRecipe>> {
        if cancel.is_cancelled() {
            return Ok(Fetched::Cancelled);
        }

        let url = format!("{}/community/{}", self.base_url, id);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Ok(Fetched::Cancelled),
            res = self.http.get(&url).send() => res.map_err(transport_error)?,
        };

        let response = check_status(response).await?;

        let raw: RawCommunityRecipe = tokio::select! {
            _ = cancel.cancelled() => return Ok(Fetched::Cancelled),
            body = response.json() => body.map_err(transport_error)?,
        };

        Ok(Fetched::Complete(raw.normalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, mood: Option<&str>, approved: Option<bool>) -> RawCommunityRecipe {
        RawCommunityRecipe {
            id: RecipeId::Str("r1".to_string()),
            title: title.to_string(),
            image_url: None,
            summary: None,
            mood: mood.map(str::to_string),
            approved,
        }
    }

    #[test]
    fn authoritative_mood_is_never_overridden() {
        // Keyword classification would say Cozy ("soup"), but the author
        // tagged it Energetic.
        let recipe = raw("Miso Soup", Some("Energetic"), Some(true)).normalize();
        assert_eq!(recipe.mood, Mood::Energetic);
    }

    #[test]
    fn missing_or_unknown_mood_falls_back_to_classifier() {
        let legacy = raw("Miso Soup", None, Some(true)).normalize();
        assert_eq!(legacy.mood, Mood::Cozy);

        let junk = raw("Miso Soup", Some("Hangry"), Some(true)).normalize();
        assert_eq!(junk.mood, Mood::Cozy);
    }

    #[test]
    fn rejected_records_are_invisible_legacy_records_pass() {
        assert!(!raw("x", None, Some(false)).is_visible());
        assert!(raw("x", None, Some(true)).is_visible());
        assert!(raw("x", None, None).is_visible());
    }

    #[test]
    fn normalized_community_recipe_has_empty_diet_tags() {
        let recipe = raw("Family Stew", None, Some(true)).normalize();
        assert!(recipe.diet_tags.is_empty());
        assert_eq!(recipe.source, SourceKind::Community);
        assert_eq!(recipe.approved, Some(true));
    }
}
