//! Capabilities the stages depend on. Each is a narrow async trait so the HTTP
//! clients can be swapped for scripted fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tripmind_models::GeoPoint;

use crate::error::TripError;

/// Current conditions as reported upstream, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentWeather {
    pub temperature: f64,
    /// Percent; upstream may report values outside 0..=100 or none at all.
    pub precipitation_probability: Option<f64>,
    pub condition_text: String,
}

/// A point of interest near a location. Unnamed points are allowed upstream
/// and filtered out by the places stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedPoint {
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Upstream category, e.g. "museum" or "park".
    pub kind: Option<String>,
}

/// Resolves free text to candidate points, best match first.
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &str;

    /// An empty list means the text is not a known place.
    async fn lookup(&self, text: &str) -> Result<Vec<GeoPoint>, TripError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather, TripError>;
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Points within `radius_meters`, in upstream relevance order.
    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: u32,
    ) -> Result<Vec<NamedPoint>, TripError>;
}
