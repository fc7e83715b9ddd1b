use super::dates::parse_date_expression;
use super::providers::{ClimateProvider, ForecastProvider, ForecastSlice, Geocoder};
use crate::error::{ResolutionError, Result};
use chrono::{Datelike, Local, Months, NaiveDate};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use tracing::info;

/// Dates up to this many days ahead are answered with a forecast.
pub const FORECAST_HORIZON_DAYS: i64 = 5;

/// Length of the historical window used for climatological averages.
pub const CLIMATE_WINDOW_YEARS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    Forecast,
    Climate,
}

/// Forecast when `target` is at most [`FORECAST_HORIZON_DAYS`] after `today`.
pub fn horizon_for(target: NaiveDate, today: NaiveDate) -> Horizon {
    if (target - today).num_days() <= FORECAST_HORIZON_DAYS {
        Horizon::Forecast
    } else {
        Horizon::Climate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeatherAnswer {
    Forecast {
        place: String,
        date: NaiveDate,
        slices: Vec<ForecastSlice>,
    },
    Climate {
        place: String,
        month: u32,
        mean_temperature: f64,
        mean_precipitation: f64,
        years: usize,
    },
}

impl WeatherAnswer {
    pub fn kind(&self) -> &'static str {
        match self {
            WeatherAnswer::Forecast { .. } => "forecast",
            WeatherAnswer::Climate { .. } => "climate",
        }
    }

    pub fn render(&self) -> String {
        match self {
            WeatherAnswer::Forecast {
                place,
                date,
                slices,
            } => {
                let mut text = format!("Forecast for {} on {}:", place, date);
                for slice in slices {
                    let _ = write!(
                        text,
                        "\n{}: {}, {}°C",
                        slice.timestamp,
                        capitalize(&slice.description),
                        slice.temperature
                    );
                }
                text
            }
            WeatherAnswer::Climate {
                place,
                month,
                mean_temperature,
                mean_precipitation,
                ..
            } => format!(
                "Avg. {} in {}: {:.1}°C, {:.1}mm rain",
                place,
                month_name(*month),
                mean_temperature,
                mean_precipitation
            ),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown month")
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Answers "what will the weather be like in X on Y" with either a forecast
/// or a climatological expectation, depending on how far away Y is.
#[derive(Debug, Clone)]
pub struct WeatherResolver {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastProvider>,
    climate: Arc<dyn ClimateProvider>,
}

impl WeatherResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastProvider>,
        climate: Arc<dyn ClimateProvider>,
    ) -> Self {
        Self {
            geocoder,
            forecast,
            climate,
        }
    }

    /// Resolve relative to the local calendar date.
    pub async fn resolve(&self, place: &str, date_expression: &str) -> Result<WeatherAnswer> {
        self.resolve_on(place, date_expression, Local::now().date_naive())
            .await
    }

    pub async fn resolve_on(
        &self,
        place: &str,
        date_expression: &str,
        today: NaiveDate,
    ) -> Result<WeatherAnswer> {
        let target = parse_date_expression(date_expression, today)?;

        let coordinates = self
            .geocoder
            .geocode(place)
            .await?
            .ok_or_else(|| ResolutionError::PlaceNotFound(place.to_string()))?;

        let horizon = horizon_for(target, today);
        info!(
            target: "travel::weather",
            place,
            date = %target,
            ?horizon,
            "resolving weather"
        );

        match horizon {
            Horizon::Forecast => self.forecast_for(place, target).await,
            Horizon::Climate => {
                let end = today;
                let start = today
                    .checked_sub_months(Months::new(CLIMATE_WINDOW_YEARS * 12))
                    .unwrap_or(today);
                let history = self
                    .climate
                    .monthly_history(coordinates, start, end)
                    .await?;

                let matching: Vec<_> = history
                    .iter()
                    .filter(|aggregate| aggregate.month == target.month())
                    .collect();

                let mean_temperature = mean(matching.iter().filter_map(|a| a.mean_temperature));
                let mean_precipitation = mean(matching.iter().filter_map(|a| a.precipitation));

                match (mean_temperature, mean_precipitation) {
                    (Some(mean_temperature), Some(mean_precipitation)) => {
                        Ok(WeatherAnswer::Climate {
                            place: place.to_string(),
                            month: target.month(),
                            mean_temperature,
                            mean_precipitation,
                            years: matching.len(),
                        })
                    }
                    _ => Err(ResolutionError::Provider(format!(
                        "No climate records for {} in {}",
                        place,
                        month_name(target.month())
                    ))
                    .into()),
                }
            }
        }
    }

    async fn forecast_for(&self, place: &str, target: NaiveDate) -> Result<WeatherAnswer> {
        if !self.forecast.has_credentials() {
            return Err(ResolutionError::MissingCredentials.into());
        }

        let day = target.to_string();
        let slices: Vec<ForecastSlice> = self
            .forecast
            .forecast(place)
            .await?
            .into_iter()
            .filter(|slice| slice.timestamp.starts_with(&day))
            .collect();

        if slices.is_empty() {
            return Err(ResolutionError::NoForecastAvailable {
                place: place.to_string(),
                date: day,
            }
            .into());
        }

        Ok(WeatherAnswer::Forecast {
            place: place.to_string(),
            date: target,
            slices,
        })
    }
}
