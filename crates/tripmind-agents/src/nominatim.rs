use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tripmind_models::{GeoPoint, GeocodingConfig};

use crate::error::TripError;
use crate::http::{build_client, check_status};
use crate::provider::Geocoder;

/// Forward geocoding against a Nominatim search endpoint.
///
/// Nominatim's usage policy allows one request per second; pacing is the
/// geocoding stage's job, not this client's.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig, timeout: Duration) -> Result<Self, TripError> {
        Ok(Self {
            client: build_client(&config.user_agent, timeout)?,
            base_url: config.base_url.clone(),
            email: config.email.clone(),
        })
    }
}

impl SearchHit {
    fn into_point(self) -> Result<GeoPoint, TripError> {
        let latitude: f64 = self
            .lat
            .parse()
            .map_err(|e| TripError::Upstream(format!("Invalid latitude {:?}: {e}", self.lat)))?;
        let longitude: f64 = self
            .lon
            .parse()
            .map_err(|e| TripError::Upstream(format!("Invalid longitude {:?}: {e}", self.lon)))?;
        GeoPoint::new(latitude, longitude, self.display_name)
            .map_err(|e| TripError::Upstream(e.to_string()))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
    }

    async fn lookup(&self, text: &str) -> Result<Vec<GeoPoint>, TripError> {
        debug!(query = text, "Nominatim search");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", text),
                ("format", "json"),
                ("limit", "1"),
                ("email", self.email.as_str()),
            ])
            .send()
            .await?;

        let hits: Vec<SearchHit> = check_status(self.name(), response).await?.json().await?;
        hits.into_iter().map(SearchHit::into_point).collect()
    }
}
