use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tripmind_models::PlacesConfig;

use crate::error::TripError;
use crate::http::{build_client, check_status};
use crate::provider::{NamedPoint, PlacesProvider};

/// Tag values treated as proper attractions; these rank ahead of other named points.
const ATTRACTION_KINDS: &[&str] = &[
    "attraction",
    "museum",
    "gallery",
    "viewpoint",
    "zoo",
    "theme_park",
    "park",
    "monument",
    "palace",
    "castle",
    "fort",
    "memorial",
];

/// Points of interest from an Overpass API interpreter endpoint.
pub struct OverpassPlaces {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

impl OverpassPlaces {
    pub fn new(
        config: &PlacesConfig,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, TripError> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            base_url: config.base_url.clone(),
        })
    }
}

/// Overpass QL for tourism, park and historic features around a point.
/// `out center` gives ways a representative coordinate.
pub fn build_query(latitude: f64, longitude: f64, radius_meters: u32) -> String {
    let around = format!("(around:{radius_meters},{latitude},{longitude})");
    let selectors = [r#"["tourism"]"#, r#"["leisure"="park"]"#, r#"["historic"]"#];
    let body: String = selectors
        .iter()
        .flat_map(|sel| ["node", "way"].map(|kind| format!("  {kind}{sel}{around};\n")))
        .collect();
    format!("[out:json][timeout:25];\n(\n{body});\nout center;")
}

impl Element {
    fn kind(&self) -> Option<&str> {
        ["tourism", "leisure", "historic"]
            .iter()
            .find_map(|tag| self.tags.get(*tag))
            .map(String::as_str)
    }

    fn is_attraction(&self) -> bool {
        self.kind()
            .map(|kind| ATTRACTION_KINDS.iter().any(|a| kind.contains(a)))
            .unwrap_or(false)
    }

    fn into_point(self, fallback: (f64, f64)) -> NamedPoint {
        let (latitude, longitude) = match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => fallback,
        };
        NamedPoint {
            kind: self.kind().map(str::to_string),
            name: self.tags.get("name").cloned(),
            latitude,
            longitude,
        }
    }
}

/// Attractions first, then everything else; upstream order within each group.
fn rank(elements: Vec<Element>, fallback: (f64, f64)) -> Vec<NamedPoint> {
    let (attractions, others): (Vec<Element>, Vec<Element>) =
        elements.into_iter().partition(Element::is_attraction);
    attractions
        .into_iter()
        .chain(others)
        .map(|e| e.into_point(fallback))
        .collect()
}

#[async_trait]
impl PlacesProvider for OverpassPlaces {
    fn name(&self) -> &str {
        "overpass"
    }

    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: u32,
    ) -> Result<Vec<NamedPoint>, TripError> {
        debug!(latitude, longitude, radius_meters, "Overpass nearby search");
        let query = build_query(latitude, longitude, radius_meters);
        let response = self
            .client
            .post(&self.base_url)
            .form(&[("data", query)])
            .send()
            .await?;

        let body: OverpassResponse = check_status(self.name(), response).await?.json().await?;
        Ok(rank(body.elements, (latitude, longitude)))
    }
}
