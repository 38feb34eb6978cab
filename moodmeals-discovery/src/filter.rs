//! Filter predicate evaluator
//!
//! One predicate applied uniformly to every normalized record, regardless
//! of which clauses the upstream already handled natively. All clauses are
//! combined with AND; each clause is vacuously true when its criterion is
//! empty, so widening any single criterion never turns a matching recipe
//! into a non-match.

use moodmeals_common::{FilterCriteria, NormalizedRecipe, SourceKind};

/// Does `recipe` satisfy every active clause of `criteria`?
pub fn matches(recipe: &NormalizedRecipe, criteria: &FilterCriteria) -> bool {
    matches_search(recipe, &criteria.search)
        && matches_diet(recipe, criteria.diet.as_deref())
        && matches_allergy(recipe, &criteria.allergy)
        && matches_mood(recipe, criteria)
}

/// Case-insensitive substring match against the title only (not summary).
fn matches_search(recipe: &NormalizedRecipe, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    recipe.title.to_lowercase().contains(&search.to_lowercase())
}

/// Diet clause. Community recipes carry no diet metadata, so an active
/// diet filter is a no-op for them rather than an automatic rejection;
/// otherwise every community recipe would vanish whenever any diet filter
/// is on. This is a deliberate policy, not an oversight.
fn matches_diet(recipe: &NormalizedRecipe, diet: Option<&str>) -> bool {
    let Some(diet) = diet else {
        return true;
    };
    if recipe.source == SourceKind::Community {
        return true;
    }
    recipe
        .diet_tags
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(diet))
}

/// Allergy clause: reject the recipe if ANY allergen appears as a
/// case-insensitive substring of title + summary.
///
/// This is an approximate safety filter over free text, never a
/// guarantee: an allergen present in the ingredients but absent from the
/// title/summary text will not be caught. Surfaces exposing this filter
/// must disclose that to the user.
fn matches_allergy(recipe: &NormalizedRecipe, allergens: &[String]) -> bool {
    if allergens.is_empty() {
        return true;
    }
    let text = recipe.searchable_text();
    !allergens
        .iter()
        .any(|allergen| text.contains(&allergen.to_lowercase()))
}

/// Mood clause: empty selection means no restriction.
fn matches_mood(recipe: &NormalizedRecipe, criteria: &FilterCriteria) -> bool {
    criteria.mood.is_empty() || criteria.mood.contains(&recipe.mood)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodmeals_common::{Mood, RecipeId};

    fn recipe(title: &str, summary: &str, mood: Mood, source: SourceKind) -> NormalizedRecipe {
        NormalizedRecipe {
            id: RecipeId::Int(1),
            title: title.to_string(),
            image_url: None,
            summary_text: if summary.is_empty() {
                None
            } else {
                Some(summary.to_string())
            },
            mood,
            diet_tags: vec![],
            source,
            approved: None,
        }
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria::new()
    }

    #[test]
    fn empty_criteria_match_everything() {
        let r = recipe("Anything", "", Mood::Happy, SourceKind::External);
        assert!(matches(&r, &criteria()));
    }

    #[test]
    fn search_matches_title_substring_case_insensitive() {
        let r = recipe("Spicy Avocado Noodles", "", Mood::Energetic, SourceKind::External);
        let mut c = criteria();

        c.search = "noodle".to_string();
        assert!(matches(&r, &c));

        c.search = "NOODLE".to_string();
        assert!(matches(&r, &c));

        c.search = "burger".to_string();
        assert!(!matches(&r, &c));
    }

    #[test]
    fn search_does_not_match_summary() {
        let r = recipe("Green Bowl", "with rice noodles", Mood::Happy, SourceKind::External);
        let mut c = criteria();
        c.search = "noodle".to_string();
        assert!(!matches(&r, &c));
    }

    #[test]
    fn diet_requires_tag_on_external_recipes() {
        let mut r = recipe("Lentil Stew", "", Mood::Happy, SourceKind::External);
        let mut c = criteria();
        c.diet = Some("vegan".to_string());

        assert!(!matches(&r, &c));

        r.diet_tags = vec!["Vegan".to_string(), "gluten free".to_string()];
        assert!(matches(&r, &c));
    }

    #[test]
    fn diet_is_a_noop_for_community_recipes() {
        let r = recipe("Grandma's Stew", "", Mood::Happy, SourceKind::Community);
        let mut c = criteria();
        c.diet = Some("vegan".to_string());
        assert!(matches(&r, &c));
    }

    #[test]
    fn allergy_excludes_on_title_or_summary_text() {
        let r = recipe("Peanut Satay", "with crushed peanuts", Mood::Happy, SourceKind::External);
        let mut c = criteria();
        c.allergy = vec!["Peanut".to_string()];
        assert!(!matches(&r, &c));

        let clean = recipe("Tomato Pasta", "simple sauce", Mood::Happy, SourceKind::External);
        assert!(matches(&clean, &c));
    }

    #[test]
    fn mood_selection_includes_only_members() {
        let r = recipe("Ramen", "", Mood::Energetic, SourceKind::External);
        let mut c = criteria();

        c.mood = vec![Mood::Energetic, Mood::Cozy];
        assert!(matches(&r, &c));

        c.mood = vec![Mood::Relaxed];
        assert!(!matches(&r, &c));
    }

    #[test]
    fn search_and_mood_clauses_combine() {
        let r = recipe("Spicy Avocado Noodles", "", Mood::Energetic, SourceKind::External);
        let mut c = criteria();
        c.search = "noodle".to_string();
        c.mood = vec![Mood::Energetic];
        assert!(matches(&r, &c));
    }

    #[test]
    fn widening_any_criterion_is_monotonic() {
        let r = recipe("Chili Noodles", "very spicy", Mood::Energetic, SourceKind::External);
        let mut narrow = criteria();
        narrow.search = "chili".to_string();
        narrow.mood = vec![Mood::Energetic];
        narrow.allergy = vec!["shellfish".to_string()];
        assert!(matches(&r, &narrow));

        // Widen each dimension one at a time; the recipe must keep matching.
        let mut wider = narrow.clone();
        wider.search.clear();
        assert!(matches(&r, &wider));

        let mut wider = narrow.clone();
        wider.mood.clear();
        assert!(matches(&r, &wider));

        let mut wider = narrow.clone();
        wider.allergy.clear();
        assert!(matches(&r, &wider));
    }
}
