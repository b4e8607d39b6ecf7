use serde::{Deserialize, Serialize};

/// Pricing labels offered as filter choices
pub const PRICING_OPTIONS: [&str; 3] = ["Free", "Free + Paid", "Free Trial + Paid"];

/// One catalog entry - a third-party tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub category: String,
    /// "Free", "Free + Paid", "Free Trial + Paid" or some paid label
    pub pricing: String,
    pub link: String,
    pub description: String,
    /// 0.0 - 5.0
    pub rating: f64,
    /// 0 - 100
    pub popularity: u8,
    #[serde(default)]
    pub featured: bool,
}

impl Tool {
    pub fn pricing_tier(&self) -> PricingTier {
        PricingTier::of(&self.pricing)
    }

    pub fn popularity_level(&self) -> PopularityLevel {
        PopularityLevel::of(self.popularity)
    }
}

/// Coarse pricing bucket derived from the free-form label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingTier {
    Free,
    Freemium,
    Paid,
}

impl PricingTier {
    pub fn of(label: &str) -> Self {
        if label == "Free" {
            PricingTier::Free
        } else if label.contains("Free") {
            PricingTier::Freemium
        } else {
            PricingTier::Paid
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PricingTier::Free => "Free",
            PricingTier::Freemium => "Freemium",
            PricingTier::Paid => "Paid",
        }
    }
}

/// How popular a tool is, bucketed for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopularityLevel {
    VeryHigh,
    High,
    Medium,
    Growing,
}

impl PopularityLevel {
    pub fn of(popularity: u8) -> Self {
        match popularity {
            90..=u8::MAX => PopularityLevel::VeryHigh,
            80..=89 => PopularityLevel::High,
            70..=79 => PopularityLevel::Medium,
            _ => PopularityLevel::Growing,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PopularityLevel::VeryHigh => "Very High",
            PopularityLevel::High => "High",
            PopularityLevel::Medium => "Medium",
            PopularityLevel::Growing => "Growing",
        }
    }
}

impl std::fmt::Display for PopularityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_tier() {
        assert_eq!(PricingTier::of("Free"), PricingTier::Free);
        assert_eq!(PricingTier::of("Free + Paid"), PricingTier::Freemium);
        assert_eq!(PricingTier::of("Free Trial + Paid"), PricingTier::Freemium);
        assert_eq!(PricingTier::of("Paid"), PricingTier::Paid);
        // exact match only for the pure free tier
        assert_eq!(PricingTier::of("free"), PricingTier::Paid);
    }

    #[test]
    fn test_popularity_level_boundaries() {
        assert_eq!(PopularityLevel::of(100), PopularityLevel::VeryHigh);
        assert_eq!(PopularityLevel::of(90), PopularityLevel::VeryHigh);
        assert_eq!(PopularityLevel::of(89), PopularityLevel::High);
        assert_eq!(PopularityLevel::of(80), PopularityLevel::High);
        assert_eq!(PopularityLevel::of(70), PopularityLevel::Medium);
        assert_eq!(PopularityLevel::of(69), PopularityLevel::Growing);
        assert_eq!(PopularityLevel::of(0).label(), "Growing");
    }

    #[test]
    fn test_tool_deserializes_without_featured_flag() {
        let json = r#"{
            "id": "a", "name": "Foo", "category": "Chat", "pricing": "Free",
            "link": "https://foo.example", "description": "d",
            "rating": 4.5, "popularity": 80
        }"#;
        let tool: Tool = serde_json::from_str(json).unwrap();
        assert!(!tool.featured);
        assert_eq!(tool.popularity_level(), PopularityLevel::High);
    }
}
