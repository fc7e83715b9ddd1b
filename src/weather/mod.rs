//! Weather and climate lookup with a forecast/climatology horizon split

pub mod dates;
pub mod providers;
pub mod resolver;

pub use dates::parse_date_expression;
pub use providers::{
    ClimateProvider, Coordinates, ForecastProvider, ForecastSlice, Geocoder, MonthlyAggregate,
    NominatimGeocoder, OpenMeteoClimate, OpenWeatherForecast,
};
pub use resolver::{horizon_for, Horizon, WeatherAnswer, WeatherResolver, FORECAST_HORIZON_DAYS};
