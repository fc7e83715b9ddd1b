use travel_assistant::travel::{estimate, format_rupees, format_travel_summary};
use travel_assistant::types::{AgeGroup, TravelProfile, TravelStyle};

const DESTINATIONS: &[&str] = &["Goa", "manali", "DUBAI", "Paris", "Reykjavik"];
const STYLES: &[TravelStyle] = &[TravelStyle::Budget, TravelStyle::Midrange, TravelStyle::Luxury];
const AGE_GROUPS: &[AgeGroup] = &[AgeGroup::None, AgeGroup::Kids, AgeGroup::Elderly];

fn profiles() -> impl Iterator<Item = TravelProfile> {
    DESTINATIONS.iter().flat_map(|destination| {
        STYLES.iter().flat_map(move |style| {
            AGE_GROUPS.iter().map(move |age| {
                TravelProfile::new(*destination, 3, *style)
                    .with_age_group(*age)
                    .with_activities(vec!["Snorkelling".to_string(), "Market walk".to_string()])
            })
        })
    })
}

#[test]
fn per_unit_rates_do_not_depend_on_party_size_or_days() {
    for profile in profiles() {
        let base = estimate(&profile);
        for people in [2, 5] {
            for days in [1, 10] {
                let mut scaled = profile.clone().with_party_size(people);
                scaled.duration = days;
                let breakdown = estimate(&scaled);
                assert_eq!(breakdown.hotel_price_per_night, base.hotel_price_per_night);
                assert_eq!(breakdown.food_cost_per_day, base.food_cost_per_day);
                assert_eq!(breakdown.activity_cost_per_day, base.activity_cost_per_day);
                assert_eq!(breakdown.party_size, people);
            }
        }
    }
}

#[test]
fn totals_scale_linearly_with_party_size() {
    for profile in profiles() {
        let single = estimate(&profile).totals(profile.duration, profile.activities.len());
        let group = profile.clone().with_party_size(4);
        let grouped = estimate(&group).totals(group.duration, group.activities.len());

        assert_eq!(grouped.hotel, single.hotel * 4);
        assert_eq!(grouped.food, single.food * 4);
        assert_eq!(grouped.activities, single.activities * 4);
        assert_eq!(grouped.transport, single.transport);
    }
}

#[test]
fn unknown_style_prices_like_midrange() {
    let unknown = TravelProfile::new("Goa", 2, TravelStyle::parse_lenient("glamping"));
    let midrange = TravelProfile::new("Goa", 2, TravelStyle::Midrange);
    assert_eq!(estimate(&unknown), estimate(&midrange));
}

#[test]
fn unknown_destination_prices_like_goa() {
    for style in STYLES {
        let unknown = TravelProfile::new("Reykjavik", 2, *style);
        let goa = TravelProfile::new("goa", 2, *style);
        assert_eq!(estimate(&unknown), estimate(&goa));
    }
}

#[test]
fn summary_total_matches_line_items() {
    for profile in profiles() {
        let breakdown = estimate(&profile);
        let totals = breakdown.totals(profile.duration, profile.activities.len());
        let summary = format_travel_summary(&profile, &breakdown);

        assert!(summary.contains(&format!("Total Est. Cost: {}", format_rupees(totals.total))));
        assert_eq!(
            totals.total,
            totals.hotel + totals.food + totals.activities + totals.transport
        );
    }
}

#[test]
fn kids_are_cheaper_than_adults() {
    let adults = estimate(&TravelProfile::new("Dubai", 3, TravelStyle::Luxury));
    let kids = estimate(
        &TravelProfile::new("Dubai", 3, TravelStyle::Luxury).with_age_group(AgeGroup::Kids),
    );
    assert!(kids.hotel_price_per_night < adults.hotel_price_per_night);
    assert!(kids.food_cost_per_day < adults.food_cost_per_day);
    assert!(kids.activity_cost_per_day < adults.activity_cost_per_day);
}
