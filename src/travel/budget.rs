use crate::types::travel_types::{CostBreakdown, TravelProfile};
use tracing::debug;

/// Destination whose rates are used when a destination is unknown
pub const DEFAULT_DESTINATION: &str = "goa";

/// Flat transport cost, independent of party size and duration
pub const TRANSPORT_COST: u64 = 2000;

/// Budget-style base rates for a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseRates {
    pub hotel: u64,
    pub food: u64,
    pub activities: u64,
}

const CITY_BASE_RATES: &[(&str, BaseRates)] = &[
    (
        "goa",
        BaseRates {
            hotel: 1000,
            food: 400,
            activities: 300,
        },
    ),
    (
        "manali",
        BaseRates {
            hotel: 900,
            food: 350,
            activities: 250,
        },
    ),
    (
        "dubai",
        BaseRates {
            hotel: 3500,
            food: 1200,
            activities: 1000,
        },
    ),
    (
        "paris",
        BaseRates {
            hotel: 5000,
            food: 2000,
            activities: 1200,
        },
    ),
];

/// Look up base rates case-insensitively, falling back to the default destination.
pub fn base_rates(destination: &str) -> BaseRates {
    let key = destination.trim().to_lowercase();
    lookup(&key).unwrap_or_else(|| {
        debug!(
            target: "travel::budget",
            destination = %destination,
            "unknown destination, using default rates"
        );
        default_rates()
    })
}

fn lookup(key: &str) -> Option<BaseRates> {
    CITY_BASE_RATES
        .iter()
        .find(|(city, _)| *city == key)
        .map(|(_, rates)| *rates)
}

fn default_rates() -> BaseRates {
    CITY_BASE_RATES[0].1
}

fn scale(base: u64, style: f64, age: f64) -> u64 {
    (base as f64 * style * age).round() as u64
}

/// Derive per-unit rates for a trip. Never fails: unknown inputs fall back to defaults.
pub fn estimate(profile: &TravelProfile) -> CostBreakdown {
    let rates = base_rates(&profile.destination);
    let style = profile.style.multiplier();
    let age = profile.age_group.modifier();

    CostBreakdown {
        hotel_price_per_night: scale(rates.hotel, style, age.hotel),
        food_cost_per_day: scale(rates.food, style, age.food),
        activity_cost_per_day: scale(rates.activities, style, age.activity),
        transport_cost: TRANSPORT_COST,
        party_size: profile.party_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::travel_types::{AgeGroup, TravelStyle};

    #[test]
    fn test_goa_budget_for_two() {
        let profile = TravelProfile::new("Goa", 3, TravelStyle::Budget).with_party_size(2);
        let breakdown = estimate(&profile);

        assert_eq!(breakdown.hotel_price_per_night, 1000);
        assert_eq!(breakdown.food_cost_per_day, 400);
        assert_eq!(breakdown.activity_cost_per_day, 300);

        let totals = breakdown.totals(profile.duration, profile.activities.len());
        assert_eq!(totals.hotel, 6000);
        assert_eq!(totals.food, 2400);
        assert_eq!(totals.transport, 2000);
    }

    #[test]
    fn test_unknown_destination_uses_default() {
        let unknown = estimate(&TravelProfile::new("Unknown City", 1, TravelStyle::Luxury));
        let goa = estimate(&TravelProfile::new("Goa", 1, TravelStyle::Luxury));
        assert_eq!(unknown, goa);
        assert_eq!(unknown.hotel_price_per_night, 3500);
    }

    #[test]
    fn test_destination_is_case_insensitive() {
        assert_eq!(base_rates("PARIS"), base_rates("paris"));
        assert_eq!(base_rates(" Dubai ").hotel, 3500);
    }

    #[test]
    fn test_midrange_rounds() {
        let breakdown = estimate(&TravelProfile::new("manali", 2, TravelStyle::Midrange));
        assert_eq!(breakdown.hotel_price_per_night, 1620);
        assert_eq!(breakdown.food_cost_per_day, 630);
        assert_eq!(breakdown.activity_cost_per_day, 450);
    }

    #[test]
    fn test_age_modifiers() {
        let kids = estimate(
            &TravelProfile::new("goa", 2, TravelStyle::Budget).with_age_group(AgeGroup::Kids),
        );
        assert_eq!(kids.hotel_price_per_night, 500);
        assert_eq!(kids.food_cost_per_day, 280);
        assert_eq!(kids.activity_cost_per_day, 180);

        let elderly = estimate(
            &TravelProfile::new("goa", 2, TravelStyle::Budget).with_age_group(AgeGroup::Elderly),
        );
        assert_eq!(elderly.hotel_price_per_night, 1200);
        assert_eq!(elderly.food_cost_per_day, 360);
        assert_eq!(elderly.activity_cost_per_day, 240);
    }

    #[test]
    fn test_transport_is_constant() {
        let short = estimate(&TravelProfile::new("paris", 1, TravelStyle::Luxury));
        let long = estimate(&TravelProfile::new("paris", 14, TravelStyle::Luxury).with_party_size(6));
        assert_eq!(short.transport_cost, long.transport_cost);
    }
}
