use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{ToolError, truncate_body},
    model::Coordinates,
};

const ENDPOINT: &str = "Nominatim";

/// Place search against a Nominatim-compatible endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    url: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Coordinates of the first match for `query`.
    ///
    /// The query is forwarded as-is. An empty result set is a
    /// [`ToolError::NoMatch`], never a default position.
    pub async fn geocode(&self, query: &str) -> Result<Coordinates, ToolError> {
        tracing::debug!(query, url = %self.url, "geocoding");

        let res = self
            .http
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, "geocoding request failed");
            return Err(ToolError::Http {
                endpoint: ENDPOINT,
                status,
                body: truncate_body(&body),
            });
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&body)
            .map_err(|e| ToolError::Data(format!("Failed to parse {ENDPOINT} JSON: {e}")))?;

        let place = places.first().ok_or_else(|| ToolError::NoMatch(query.to_string()))?;

        Ok(Coordinates {
            latitude: parse_degrees("lat", &place.lat)?,
            longitude: parse_degrees("lon", &place.lon)?,
        })
    }
}

fn parse_degrees(field: &str, value: &str) -> Result<f64, ToolError> {
    value.trim().parse().map_err(|_| {
        ToolError::Data(format!("{ENDPOINT} returned non-numeric {field}: '{value}'"))
    })
}
