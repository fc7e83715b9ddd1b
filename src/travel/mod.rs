//! Trip cost estimation and itemized summaries

pub mod budget;
pub mod summary;

pub use budget::{base_rates, estimate, BaseRates, DEFAULT_DESTINATION, TRANSPORT_COST};
pub use summary::{format_rupees, format_travel_summary};
