use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::GeocoderConfig;
use crate::database::models::Location;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No geocoding match for '{0}'")]
    NoMatch(String),

    #[error("Geocoder API key is not configured")]
    NotConfigured,

    #[error("Geocoder responded with status {0}")]
    Status(u16),

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Address or postal code to a GeoJSON point
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError>;
}

/// MapQuest geocoding API client
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MapQuestGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError> {
        let key = self.api_key.as_deref().ok_or(GeocodeError::NotConfigured)?;
        let url = format!("{}/geocoding/v1/address", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", key), ("location", address)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body: MapQuestResponse = response.json().await?;
        tracing::debug!("geocoded '{}' with {} result sets", address, body.results.len());
        body.into_location()
            .ok_or_else(|| GeocodeError::NoMatch(address.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: LatLng,
    #[serde(default)]
    street: String,
    #[serde(default)]
    admin_area5: String,
    #[serde(default)]
    admin_area3: String,
    #[serde(default)]
    postal_code: String,
    #[serde(default)]
    admin_area1: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl MapQuestResponse {
    fn into_location(self) -> Option<Location> {
        let first = self.results.into_iter().next()?.locations.into_iter().next()?;
        let non_empty = |s: String| (!s.trim().is_empty()).then_some(s);

        let state_zip = [first.admin_area3.as_str(), first.postal_code.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let formatted = [
            first.street.as_str(),
            first.admin_area5.as_str(),
            state_zip.as_str(),
            first.admin_area1.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

        let mut location = Location::point(first.lat_lng.lng, first.lat_lng.lat);
        location.formatted_address = non_empty(formatted);
        location.street = non_empty(first.street);
        location.city = non_empty(first.admin_area5);
        location.state = non_empty(first.admin_area3);
        location.zipcode = non_empty(first.postal_code);
        location.country = non_empty(first.admin_area1);
        Some(location)
    }
}
