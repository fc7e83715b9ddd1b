use super::tool::Capability;
use crate::weather::WeatherResolver;
use crate::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

/// Arguments for the `weather_forecast` tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherArgs {
    /// City name, e.g. "Manali"
    pub city: String,
    /// Date as written by the user: "2025-07-01", "tomorrow", "next Friday", "in 3 weeks", "July"
    pub date: String,
}

/// Weather for a city on a date: a forecast when the date is near, otherwise
/// the climatological average for that month.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    resolver: WeatherResolver,
}

impl WeatherTool {
    pub fn new(resolver: WeatherResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Capability for WeatherTool {
    type Args = WeatherArgs;

    const NAME: &'static str = "weather_forecast";
    const DESCRIPTION: &'static str = "Get the weather for a city on a date. Dates within five days return a forecast; \
         later dates return the historical monthly average.";

    async fn invoke(&self, args: WeatherArgs) -> Result<Value> {
        let answer = self.resolver.resolve(&args.city, &args.date).await?;
        Ok(json!({
            "kind": answer.kind(),
            "text": answer.render(),
        }))
    }
}
