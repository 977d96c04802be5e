use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Position resolved from the first geocoding match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Renders as `"lat, lon"`, e.g. `"48.8566, 2.3522"` or `"10.0, 20.0"`.
    pub fn label(&self) -> String {
        format!("{}, {}", decimal(self.latitude), decimal(self.longitude))
    }
}

/// Shortest round-trip form; exponents are signed with at least two digits (`1e-05`).
fn decimal(value: f64) -> String {
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// Weather for the first hour of the provider's hourly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub location: String,
    pub temperature: f64,
    pub temperature_unit: String,
    pub precipitation_probability: u8,
    pub time: String,
    pub timezone: String,
}

/// Classified outcome of a weather lookup.
#[derive(Debug)]
pub enum WeatherLookup {
    Found(WeatherResult),
    NotFound,
    ProviderError(ToolError),
}

impl From<Result<WeatherResult, ToolError>> for WeatherLookup {
    fn from(result: Result<WeatherResult, ToolError>) -> Self {
        match result {
            Ok(weather) => WeatherLookup::Found(weather),
            Err(ToolError::NoMatch(_)) => WeatherLookup::NotFound,
            Err(err) => WeatherLookup::ProviderError(err),
        }
    }
}
