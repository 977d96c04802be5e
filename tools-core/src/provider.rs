use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

use crate::{
    Config, WeatherLookup, WeatherResult,
    error::ToolError,
    provider::{nominatim::NominatimGeocoder, open_meteo::OpenMeteoForecast},
};

pub mod nominatim;
pub mod open_meteo;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, city: &str) -> Result<WeatherResult, ToolError>;

    /// Like [`get_weather`](Self::get_weather), with "no such place" split
    /// out from provider failures.
    async fn lookup(&self, city: &str) -> WeatherLookup {
        self.get_weather(city).await.into()
    }
}

/// Geocodes with Nominatim, then reads the Open-Meteo hourly forecast.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    geocoder: NominatimGeocoder,
    forecast: OpenMeteoForecast,
}

impl OpenMeteoProvider {
    pub fn new(config: &Config) -> Result<Self, ToolError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self {
            geocoder: NominatimGeocoder::new(http.clone(), &config.geocode_url, &config.user_agent),
            forecast: OpenMeteoForecast::new(http, &config.forecast_url),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn get_weather(&self, city: &str) -> Result<WeatherResult, ToolError> {
        let coords = self.geocoder.geocode(city).await?;
        let result = self.forecast.forecast(coords).await?;

        tracing::info!(city, location = %result.location, "weather resolved");
        Ok(result)
    }
}

/// Construct the weather provider described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, ToolError> {
    Ok(Box::new(OpenMeteoProvider::new(config)?))
}

/// Current weather for `city` using the default public endpoints.
pub async fn get_weather(city: &str) -> Result<WeatherResult, ToolError> {
    OpenMeteoProvider::new(&Config::default())?.get_weather(city).await
}
