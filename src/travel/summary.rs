use crate::types::travel_types::{AgeGroup, CostBreakdown, TravelProfile};
use std::fmt::Write;

/// Render an amount in rupees with thousands separators, e.g. `₹12,500`.
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₹{}", grouped)
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn party_label(party_size: u32) -> String {
    if party_size == 1 {
        "1 person".to_string()
    } else {
        format!("{} people", party_size)
    }
}

fn age_qualifier(age_group: AgeGroup) -> Option<&'static str> {
    match age_group {
        AgeGroup::None => None,
        AgeGroup::Kids => Some("travelling with kids"),
        AgeGroup::Elderly => Some("elderly travellers"),
    }
}

fn push_section(summary: &mut String, heading: &str, items: impl IntoIterator<Item = String>) {
    let lines: Vec<String> = items.into_iter().collect();
    if lines.is_empty() {
        return;
    }
    let _ = writeln!(summary, "\n{}:", heading);
    for line in lines {
        let _ = writeln!(summary, "- {}", line);
    }
}

/// Produce an itemized, human-readable summary of a trip and its estimated cost.
pub fn format_travel_summary(profile: &TravelProfile, breakdown: &CostBreakdown) -> String {
    let totals = breakdown.totals(profile.duration, profile.activities.len());
    let mut summary = String::new();

    let _ = write!(
        summary,
        "{}-Day {} Trip to {} for {}",
        profile.duration,
        profile.style,
        title_case(&profile.destination),
        party_label(breakdown.party_size)
    );
    if let Some(qualifier) = age_qualifier(profile.age_group) {
        let _ = write!(summary, " ({})", qualifier);
    }
    summary.push_str(":\n");

    let nightly = format_rupees(breakdown.hotel_price_per_night);
    push_section(
        &mut summary,
        "Hotels",
        profile
            .hotels
            .iter()
            .map(|hotel| format!("{} ({}/night)", hotel, nightly)),
    );
    push_section(&mut summary, "Restaurants", profile.restaurants.iter().cloned());
    push_section(&mut summary, "Places", profile.places_to_visit.iter().cloned());
    push_section(&mut summary, "Activities", profile.activities.iter().cloned());

    let _ = writeln!(summary, "\nTotal Est. Cost: {}", format_rupees(totals.total));
    let _ = writeln!(summary, "  • Hotel: {}", format_rupees(totals.hotel));
    let _ = writeln!(summary, "  • Food: {}", format_rupees(totals.food));
    let _ = writeln!(summary, "  • Activities: {}", format_rupees(totals.activities));
    let _ = write!(summary, "  • Transport: {}", format_rupees(totals.transport));

    summary.trim().to_string()
}
