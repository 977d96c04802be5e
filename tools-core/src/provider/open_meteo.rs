use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{ToolError, truncate_body},
    model::{Coordinates, WeatherResult},
};

const ENDPOINT: &str = "Open-Meteo";
const HOURLY_VARIABLES: &str = "temperature_2m,precipitation_probability";

/// Hourly forecast from an Open-Meteo-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<Option<String>>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<u8>>,
}

#[derive(Debug, Deserialize)]
struct OmHourlyUnits {
    temperature_2m: String,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    timezone: String,
    hourly: OmHourly,
    hourly_units: OmHourlyUnits,
}

impl OpenMeteoForecast {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Weather for the first entry of the hourly series at `coords`.
    ///
    /// The provider orders the series from the start of the local day, so
    /// "first" is whatever hour it chose to begin with.
    pub async fn forecast(&self, coords: Coordinates) -> Result<WeatherResult, ToolError> {
        tracing::debug!(
            latitude = coords.latitude,
            longitude = coords.longitude,
            url = %self.url,
            "fetching forecast"
        );

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, "forecast request failed");
            return Err(ToolError::Http {
                endpoint: ENDPOINT,
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)
            .map_err(|e| ToolError::Data(format!("Failed to parse {ENDPOINT} JSON: {e}")))?;

        first_hour(coords, parsed)
    }
}

fn first_hour(coords: Coordinates, parsed: OmForecastResponse) -> Result<WeatherResult, ToolError> {
    let OmForecastResponse {
        timezone,
        hourly,
        hourly_units,
    } = parsed;

    let temperature = first("temperature_2m", hourly.temperature_2m)?;
    let precipitation_probability =
        first("precipitation_probability", hourly.precipitation_probability)?;
    let time = first("time", hourly.time)?;

    Ok(WeatherResult {
        location: coords.label(),
        temperature,
        temperature_unit: hourly_units.temperature_2m,
        precipitation_probability,
        time,
        timezone,
    })
}

/// First entry of an hourly series. Later hours may be `null`; the first may not.
fn first<T>(series: &str, values: Vec<Option<T>>) -> Result<T, ToolError> {
    match values.into_iter().next() {
        Some(Some(value)) => Ok(value),
        Some(None) => Err(ToolError::Data(format!(
            "{ENDPOINT} hourly.{series} has no value for the first hour"
        ))),
        None => Err(ToolError::Data(format!("{ENDPOINT} hourly.{series} is empty"))),
    }
}
