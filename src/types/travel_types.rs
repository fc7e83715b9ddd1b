use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Travel style used to scale the per-destination base rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TravelStyle {
    Budget,
    #[default]
    Midrange,
    Luxury,
}

impl TravelStyle {
    /// Parse a free-form style; anything unrecognized is treated as midrange.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "budget" => TravelStyle::Budget,
            "luxury" => TravelStyle::Luxury,
            _ => TravelStyle::Midrange,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            TravelStyle::Budget => 1.0,
            TravelStyle::Midrange => 1.8,
            TravelStyle::Luxury => 3.5,
        }
    }
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TravelStyle::Budget => "Budget",
            TravelStyle::Midrange => "Midrange",
            TravelStyle::Luxury => "Luxury",
        };
        f.write_str(label)
    }
}

/// Age-group modifier applied on top of the style multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    #[default]
    None,
    Kids,
    Elderly,
}

/// Hotel, food and activity scale factors for an age group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeModifier {
    pub hotel: f64,
    pub food: f64,
    pub activity: f64,
}

impl AgeGroup {
    /// Parse a free-form age group; empty or unrecognized values mean no modifier.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "kids" => AgeGroup::Kids,
            "elderly" => AgeGroup::Elderly,
            _ => AgeGroup::None,
        }
    }

    pub fn modifier(self) -> AgeModifier {
        match self {
            AgeGroup::None => AgeModifier {
                hotel: 1.0,
                food: 1.0,
                activity: 1.0,
            },
            AgeGroup::Kids => AgeModifier {
                hotel: 0.5,
                food: 0.7,
                activity: 0.6,
            },
            AgeGroup::Elderly => AgeModifier {
                hotel: 1.2,
                food: 0.9,
                activity: 0.8,
            },
        }
    }

    pub fn is_specified(self) -> bool {
        self != AgeGroup::None
    }
}

/// Structured representation of a trip request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelProfile {
    /// Destination city as supplied by the user
    pub destination: String,
    /// Trip length in days
    pub duration: u32,
    pub style: TravelStyle,
    /// Number of travellers, at least one
    pub party_size: u32,
    pub age_group: AgeGroup,
    #[serde(default)]
    pub hotels: Vec<String>,
    #[serde(default)]
    pub restaurants: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub places_to_visit: Vec<String>,
}

impl TravelProfile {
    pub fn new(destination: impl Into<String>, duration: u32, style: TravelStyle) -> Self {
        Self {
            destination: destination.into(),
            duration,
            style,
            party_size: 1,
            age_group: AgeGroup::None,
            hotels: Vec::new(),
            restaurants: Vec::new(),
            activities: Vec::new(),
            places_to_visit: Vec::new(),
        }
    }

    pub fn with_party_size(mut self, party_size: u32) -> Self {
        self.party_size = party_size;
        self
    }

    pub fn with_age_group(mut self, age_group: AgeGroup) -> Self {
        self.age_group = age_group;
        self
    }

    pub fn with_hotels(mut self, hotels: Vec<String>) -> Self {
        self.hotels = hotels;
        self
    }

    pub fn with_restaurants(mut self, restaurants: Vec<String>) -> Self {
        self.restaurants = restaurants;
        self
    }

    pub fn with_activities(mut self, activities: Vec<String>) -> Self {
        self.activities = activities;
        self
    }

    pub fn with_places(mut self, places: Vec<String>) -> Self {
        self.places_to_visit = places;
        self
    }
}

/// Per-unit rates derived from a travel profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub hotel_price_per_night: u64,
    pub food_cost_per_day: u64,
    pub activity_cost_per_day: u64,
    pub transport_cost: u64,
    pub party_size: u32,
}

/// Trip totals computed from a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostTotals {
    pub hotel: u64,
    pub food: u64,
    pub activities: u64,
    pub transport: u64,
    pub total: u64,
}

impl CostBreakdown {
    /// Hotel and food scale with days, activities with the number of listed
    /// activities, and all three with party size. Transport is flat.
    /// Arithmetic saturates at `u64::MAX`.
    pub fn totals(&self, duration: u32, activity_count: usize) -> CostTotals {
        let people = u64::from(self.party_size);
        let days = u64::from(duration);
        let activity_count = u64::try_from(activity_count).unwrap_or(u64::MAX);
        let hotel = self
            .hotel_price_per_night
            .saturating_mul(days)
            .saturating_mul(people);
        let food = self.food_cost_per_day.saturating_mul(days).saturating_mul(people);
        let activities = self
            .activity_cost_per_day
            .saturating_mul(activity_count)
            .saturating_mul(people);
        let transport = self.transport_cost;

        CostTotals {
            hotel,
            food,
            activities,
            transport,
            total: hotel
                .saturating_add(food)
                .saturating_add(activities)
                .saturating_add(transport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_style() {
        assert_eq!(TravelStyle::parse_lenient("LUXURY"), TravelStyle::Luxury);
        assert_eq!(TravelStyle::parse_lenient(" budget "), TravelStyle::Budget);
        assert_eq!(TravelStyle::parse_lenient("backpacker"), TravelStyle::Midrange);
    }

    #[test]
    fn test_lenient_age_group() {
        assert_eq!(AgeGroup::parse_lenient("Kids"), AgeGroup::Kids);
        assert_eq!(AgeGroup::parse_lenient(""), AgeGroup::None);
        assert_eq!(AgeGroup::parse_lenient("teenagers"), AgeGroup::None);
        assert!(!AgeGroup::None.is_specified());
    }

    #[test]
    fn test_totals_transport_is_flat() {
        let breakdown = CostBreakdown {
            hotel_price_per_night: 100,
            food_cost_per_day: 10,
            activity_cost_per_day: 5,
            transport_cost: 2000,
            party_size: 3,
        };
        let totals = breakdown.totals(2, 4);
        assert_eq!(totals.hotel, 600);
        assert_eq!(totals.food, 60);
        assert_eq!(totals.activities, 60);
        assert_eq!(totals.transport, 2000);
        assert_eq!(totals.total, 2720);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let breakdown = CostBreakdown {
            hotel_price_per_night: 25_000,
            food_cost_per_day: 9_000,
            activity_cost_per_day: 4_800,
            transport_cost: 2_000,
            party_size: u32::MAX,
        };
        let totals = breakdown.totals(u32::MAX, usize::MAX);
        assert_eq!(totals.activities, u64::MAX);
        assert_eq!(totals.total, u64::MAX);
        assert!(totals.hotel > 0);
    }
}
