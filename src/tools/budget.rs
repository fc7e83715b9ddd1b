use super::tool::Capability;
use crate::travel::{estimate, format_travel_summary};
use crate::types::travel_types::{AgeGroup, TravelProfile, TravelStyle};
use crate::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

/// Longest trip the tool will price
pub const MAX_TRIP_DAYS: u32 = 365;
/// Largest party the tool will price
pub const MAX_PARTY_SIZE: u32 = 100;

fn default_party_size() -> u32 {
    1
}

/// Arguments for the `estimate_budget` tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BudgetArgs {
    /// Destination city, e.g. "Goa" or "Paris"
    pub destination: String,
    /// Trip length in days
    #[schemars(range(min = 1, max = 365))]
    pub duration: u32,
    /// Travel style: "budget", "midrange" or "luxury"
    pub style: String,
    /// Number of travellers
    #[serde(default = "default_party_size")]
    #[schemars(range(min = 1, max = 100))]
    pub party_size: u32,
    /// "kids", "elderly", or empty when not relevant
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub hotels: Vec<String>,
    #[serde(default)]
    pub restaurants: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub places_to_visit: Vec<String>,
}

impl From<BudgetArgs> for TravelProfile {
    fn from(args: BudgetArgs) -> Self {
        TravelProfile::new(
            args.destination,
            args.duration,
            TravelStyle::parse_lenient(&args.style),
        )
        .with_party_size(args.party_size)
        .with_age_group(AgeGroup::parse_lenient(&args.age_group))
        .with_hotels(args.hotels)
        .with_restaurants(args.restaurants)
        .with_activities(args.activities)
        .with_places(args.places_to_visit)
    }
}

/// Deterministic trip cost estimator
#[derive(Debug, Clone, Default)]
pub struct BudgetTool;

impl BudgetTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Capability for BudgetTool {
    type Args = BudgetArgs;

    const NAME: &'static str = "estimate_budget";
    const DESCRIPTION: &'static str = "Estimate the cost of a trip from destination, number of days, travel style, \
         party size and age group. Returns a cost breakdown in rupees and an itemized summary.";

    async fn invoke(&self, args: BudgetArgs) -> Result<Value> {
        let profile = TravelProfile::from(args);
        let breakdown = estimate(&profile);
        let totals = breakdown.totals(profile.duration, profile.activities.len());

        Ok(json!({
            "hotel_price_per_night": breakdown.hotel_price_per_night,
            "food_cost_per_day": breakdown.food_cost_per_day,
            "activity_cost_per_day": breakdown.activity_cost_per_day,
            "transport_cost": breakdown.transport_cost,
            "party_size": breakdown.party_size,
            "totals": totals,
            "summary": format_travel_summary(&profile, &breakdown),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> BudgetArgs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let parsed = args(json!({"destination": "Goa", "duration": 3, "style": "budget"}));
        assert_eq!(parsed.party_size, 1);
        assert!(parsed.age_group.is_empty());
        assert!(parsed.hotels.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_goa_budget_for_two() {
        let output = BudgetTool::new()
            .invoke(args(json!({
                "destination": "goa",
                "duration": 3,
                "style": "budget",
                "party_size": 2
            })))
            .await
            .unwrap();

        assert_eq!(output["hotel_price_per_night"], 1000);
        assert_eq!(output["party_size"], 2);
        assert_eq!(output["totals"]["hotel"], 6000);
        assert_eq!(output["totals"]["food"], 2400);
        assert!(output["summary"]
            .as_str()
            .unwrap()
            .starts_with("3-Day Budget Trip to Goa for 2 people"));
    }
}
