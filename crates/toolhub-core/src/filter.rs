// Filter engine - turns the full catalog into the visible set
use crate::models::Tool;
use std::collections::BTreeSet;
use tracing::debug;

/// How many featured tools the featured section shows
pub const FEATURED_LIMIT: usize = 6;

/// Everything the user can narrow the list by
///
/// Empty category/pricing sets mean "no restriction", not "match nothing".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub categories: BTreeSet<String>,
    pub pricing: BTreeSet<String>,
    pub min_rating: f64,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_pricing(mut self, pricing: impl Into<String>) -> Self {
        self.pricing.insert(pricing.into());
        self
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    /// Check or uncheck a category
    pub fn set_category(&mut self, category: &str, checked: bool) {
        if checked {
            self.categories.insert(category.to_string());
        } else {
            self.categories.remove(category);
        }
    }

    /// Check or uncheck a pricing label
    pub fn set_pricing(&mut self, pricing: &str, checked: bool) {
        if checked {
            self.pricing.insert(pricing.to_string());
        } else {
            self.pricing.remove(pricing);
        }
    }

    /// Back to "All Categories"
    pub fn clear_categories(&mut self) {
        self.categories.clear();
    }

    /// No search text and no category picked - the plain browsing view
    /// where the featured section is shown
    pub fn is_browsing(&self) -> bool {
        self.search.is_empty() && self.categories.is_empty()
    }

    /// Does a single tool pass every predicate?
    pub fn matches(&self, tool: &Tool) -> bool {
        self.matches_search(tool)
            && self.matches_category(tool)
            && self.matches_pricing(tool)
            && self.matches_rating(tool)
    }

    fn matches_search(&self, tool: &Tool) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        tool.name.to_lowercase().contains(&needle)
            || tool.description.to_lowercase().contains(&needle)
            || tool.category.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, tool: &Tool) -> bool {
        self.categories.is_empty() || self.categories.contains(&tool.category)
    }

    fn matches_pricing(&self, tool: &Tool) -> bool {
        self.pricing.is_empty() || self.pricing.contains(&tool.pricing)
    }

    fn matches_rating(&self, tool: &Tool) -> bool {
        tool.rating >= self.min_rating
    }
}

/// Tools that pass all criteria, in catalog order
pub fn filter(tools: &[Tool], criteria: &FilterCriteria) -> Vec<Tool> {
    let filtered: Vec<Tool> = tools
        .iter()
        .filter(|tool| criteria.matches(tool))
        .cloned()
        .collect();

    debug!("Filter kept {} of {} tools", filtered.len(), tools.len());
    filtered
}

/// Distinct categories, sorted ascending
pub fn categories(tools: &[Tool]) -> Vec<String> {
    tools
        .iter()
        .map(|t| t.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// First few featured tools, in catalog order
pub fn featured(tools: &[Tool]) -> Vec<Tool> {
    tools
        .iter()
        .filter(|t| t.featured)
        .take(FEATURED_LIMIT)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(id: &str, category: &str, pricing: &str, rating: f64, featured: bool) -> Tool {
        Tool {
            id: id.to_string(),
            name: format!("{} tool", id),
            category: category.to_string(),
            pricing: pricing.to_string(),
            link: format!("https://{}.example", id),
            description: format!("Description of {}", id),
            rating,
            popularity: 50,
            featured,
        }
    }

    fn sample() -> Vec<Tool> {
        vec![
            tool("alpha", "Chat", "Free", 4.5, true),
            tool("beta", "Image", "Free + Paid", 3.9, false),
            tool("gamma", "Chat", "Free Trial + Paid", 4.0, true),
            tool("delta", "Audio", "Paid", 2.1, false),
        ]
    }

    fn ids(tools: &[Tool]) -> Vec<&str> {
        tools.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_criteria_keeps_everything_in_order() {
        let tools = sample();
        let result = filter(&tools, &FilterCriteria::default());
        assert_eq!(result, tools);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let tools = sample();

        // name
        let result = filter(&tools, &FilterCriteria::new().with_search("ALPHA"));
        assert_eq!(ids(&result), vec!["alpha"]);

        // category
        let result = filter(&tools, &FilterCriteria::new().with_search("chat"));
        assert_eq!(ids(&result), vec!["alpha", "gamma"]);

        // description
        let result = filter(&tools, &FilterCriteria::new().with_search("description of d"));
        assert_eq!(ids(&result), vec!["delta"]);
    }

    #[test]
    fn test_category_match_is_exact() {
        let tools = sample();
        let result = filter(&tools, &FilterCriteria::new().with_category("chat"));
        assert!(result.is_empty());

        let result = filter(
            &tools,
            &FilterCriteria::new().with_category("Chat").with_category("Audio"),
        );
        assert_eq!(ids(&result), vec!["alpha", "gamma", "delta"]);
    }

    #[test]
    fn test_pricing_filter() {
        let tools = sample();
        let result = filter(
            &tools,
            &FilterCriteria::new()
                .with_pricing("Free")
                .with_pricing("Free + Paid"),
        );
        assert_eq!(ids(&result), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_rating_threshold_is_inclusive() {
        let tools = sample();
        let result = filter(&tools, &FilterCriteria::new().with_min_rating(4.0));
        assert_eq!(ids(&result), vec!["alpha", "gamma"]);

        for t in &tools {
            let criteria = FilterCriteria::new().with_min_rating(t.rating);
            assert!(criteria.matches(t), "{} should match its own rating", t.id);
        }
    }

    #[test]
    fn test_all_predicates_combine() {
        let tools = sample();
        let criteria = FilterCriteria::new()
            .with_search("tool")
            .with_category("Chat")
            .with_pricing("Free Trial + Paid")
            .with_min_rating(3.0);
        assert_eq!(ids(&filter(&tools, &criteria)), vec!["gamma"]);
    }

    #[test]
    fn test_categories_sorted_and_unique() {
        let cats = categories(&sample());
        assert_eq!(cats, vec!["Audio", "Chat", "Image"]);
    }

    #[test]
    fn test_featured_limited_and_ordered() {
        let tools: Vec<Tool> = (0..9)
            .map(|i| tool(&format!("t{}", i), "Chat", "Free", 4.0, i != 3))
            .collect();

        let picked = featured(&tools);
        assert_eq!(picked.len(), FEATURED_LIMIT);
        assert!(picked.iter().all(|t| t.featured));
        assert_eq!(ids(&picked), vec!["t0", "t1", "t2", "t4", "t5", "t6"]);
    }

    #[test]
    fn test_featured_ignores_criteria() {
        let tools = sample();
        assert_eq!(ids(&featured(&tools)), vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_criteria_toggles() {
        let mut criteria = FilterCriteria::new();
        assert!(criteria.is_browsing());

        criteria.set_category("Chat", true);
        criteria.set_pricing("Free", true);
        assert!(!criteria.is_browsing());

        criteria.set_pricing("Free", false);
        assert!(criteria.pricing.is_empty());

        criteria.clear_categories();
        assert!(criteria.is_browsing());

        // pricing alone does not hide the featured section
        criteria.set_pricing("Paid", true);
        assert!(criteria.is_browsing());
    }
}
