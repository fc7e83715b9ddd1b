pub mod result;
pub mod travel_types;

pub use result::TurnResult;
pub use travel_types::{AgeGroup, CostBreakdown, CostTotals, TravelProfile, TravelStyle};
