//! Geocoding, short-range forecast and historical climate providers.

use crate::error::{AgentError, ResolutionError, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const OPEN_METEO_ARCHIVE_BASE_URL: &str = "https://archive-api.open-meteo.com";
const USER_AGENT: &str = "travel-assistant";
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One time-slice of a short-range forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSlice {
    /// Provider timestamp, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub description: String,
    /// Degrees Celsius
    pub temperature: f64,
}

/// Aggregated observations for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    pub mean_temperature: Option<f64>,
    /// Total precipitation in millimetres
    pub precipitation: Option<f64>,
}

#[async_trait]
pub trait Geocoder: Send + Sync + std::fmt::Debug {
    /// Resolve a place name; `None` when nothing matches.
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>>;
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + std::fmt::Debug {
    /// Whether the provider has the credentials it needs.
    fn has_credentials(&self) -> bool {
        true
    }

    async fn forecast(&self, place: &str) -> Result<Vec<ForecastSlice>>;
}

#[async_trait]
pub trait ClimateProvider: Send + Sync + std::fmt::Debug {
    async fn monthly_history(
        &self,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MonthlyAggregate>>;
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(PROVIDER_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| AgentError::Config(format!("Failed to build HTTP client: {err}")))
}

/// Nominatim (OpenStreetMap) search API
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: NOMINATIM_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let places: Vec<NominatimPlace> = self
            .client
            .get(&url)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(first) = places.into_iter().next() else {
            return Ok(None);
        };

        let parse = |raw: &str| {
            raw.parse::<f64>().map_err(|err| {
                ResolutionError::Provider(format!("Invalid coordinate `{raw}`: {err}"))
            })
        };

        Ok(Some(Coordinates {
            latitude: parse(&first.lat)?,
            longitude: parse(&first.lon)?,
        }))
    }
}

/// OpenWeather 5-day / 3-hour forecast API
#[derive(Debug, Clone)]
pub struct OpenWeatherForecast {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct OpenWeatherResponse {
    #[serde(default)]
    list: Vec<OpenWeatherEntry>,
}

#[derive(Deserialize)]
struct OpenWeatherEntry {
    dt_txt: String,
    main: OpenWeatherMain,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
}

#[derive(Deserialize)]
struct OpenWeatherMain {
    temp: f64,
}

#[derive(Deserialize)]
struct OpenWeatherCondition {
    description: String,
}

impl OpenWeatherForecast {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherForecast {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn forecast(&self, place: &str) -> Result<Vec<ForecastSlice>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResolutionError::MissingCredentials)?;

        let url = format!("{}/data/2.5/forecast", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("q", place), ("appid", api_key), ("units", "metric")])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(target: "travel::weather", place, "forecast provider does not know this place");
            return Ok(Vec::new());
        }

        let body: OpenWeatherResponse = response.error_for_status()?.json().await?;
        Ok(body
            .list
            .into_iter()
            .map(|entry| ForecastSlice {
                timestamp: entry.dt_txt,
                description: entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|condition| condition.description)
                    .unwrap_or_default(),
                temperature: entry.main.temp,
            })
            .collect())
    }
}

/// Open-Meteo historical archive, aggregated from daily values into months
#[derive(Debug, Clone)]
pub struct OpenMeteoClimate {
    client: reqwest::Client,
    base_url: String,
}

/// Daily series as returned by the archive API
#[derive(Debug, Default, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    daily: DailySeries,
}

impl OpenMeteoClimate {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: OPEN_METEO_ARCHIVE_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ClimateProvider for OpenMeteoClimate {
    async fn monthly_history(
        &self,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MonthlyAggregate>> {
        let url = format!("{}/v1/archive", self.base_url.trim_end_matches('/'));
        let body: ArchiveResponse = self
            .client
            .get(&url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
                ("daily", "temperature_2m_mean,precipitation_sum".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(aggregate_monthly(&body.daily))
    }
}

#[derive(Default)]
struct MonthAccumulator {
    temperature_sum: f64,
    temperature_days: u32,
    precipitation_sum: f64,
    precipitation_days: u32,
}

/// Fold daily values into per-month mean temperature and total precipitation.
pub fn aggregate_monthly(daily: &DailySeries) -> Vec<MonthlyAggregate> {
    let mut months: BTreeMap<(i32, u32), MonthAccumulator> = BTreeMap::new();

    for (idx, day) in daily.time.iter().enumerate() {
        let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") else {
            continue;
        };
        let acc = months.entry((date.year(), date.month())).or_default();

        if let Some(Some(temp)) = daily.temperature_2m_mean.get(idx) {
            acc.temperature_sum += temp;
            acc.temperature_days += 1;
        }
        if let Some(Some(rain)) = daily.precipitation_sum.get(idx) {
            acc.precipitation_sum += rain;
            acc.precipitation_days += 1;
        }
    }

    months
        .into_iter()
        .map(|((year, month), acc)| MonthlyAggregate {
            year,
            month,
            mean_temperature: (acc.temperature_days > 0)
                .then(|| acc.temperature_sum / f64::from(acc.temperature_days)),
            precipitation: (acc.precipitation_days > 0).then_some(acc.precipitation_sum),
        })
        .collect()
}
