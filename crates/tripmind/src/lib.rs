//! TripMind - trip-planning query orchestration
//!
//! Turns a free-text travel query ("weather in Paris", "places to visit in
//! Rome") into a single structured answer by geocoding the place once and
//! fetching current weather and nearby attractions concurrently.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use tripmind::models::{PlanTripRequest, TripmindConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let orchestrator = tripmind::build_orchestrator(&TripmindConfig::default())?;
//! let result = tripmind::plan_trip(&orchestrator, "weather in Paris").await;
//! println!("{}", result.summary.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub use tripmind_agents as agents;
pub use tripmind_cache as cache;
pub use tripmind_models as models;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tripmind_agents::{
    Geocoder, NominatimGeocoder, OpenMeteoWeather, Orchestrator, OverpassPlaces, PlacesProvider,
    WeatherProvider,
};
use tripmind_models::{PlanTripRequest, PlanTripResult, TripmindConfig};

/// Build an Orchestrator over the public HTTP upstreams named in `config`.
pub fn build_orchestrator(config: &TripmindConfig) -> Result<Orchestrator, anyhow::Error> {
    let timeout = Duration::from_secs(config.orchestrator.request_timeout_seconds);
    let user_agent = &config.geocoding.user_agent;

    let geocoder = NominatimGeocoder::new(&config.geocoding, timeout)
        .context("Failed to build geocoding client")?;
    let weather = OpenMeteoWeather::new(&config.weather, user_agent, timeout)
        .context("Failed to build weather client")?;
    let places = OverpassPlaces::new(&config.places, user_agent, timeout)
        .context("Failed to build places client")?;

    Ok(Orchestrator::with_providers(
        Arc::new(geocoder) as Arc<dyn Geocoder>,
        Arc::new(weather) as Arc<dyn WeatherProvider>,
        Arc::new(places) as Arc<dyn PlacesProvider>,
        config,
    ))
}

/// Plan a trip for a raw query using the given orchestrator.
pub async fn plan_trip(orchestrator: &Orchestrator, query: &str) -> PlanTripResult {
    orchestrator.plan_trip(&PlanTripRequest::new(query)).await
}

/// Load configuration from a TOML file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<TripmindConfig, anyhow::Error> {
    let Some(path) = path else {
        return Ok(TripmindConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, TripmindConfig::default());
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/tripmind.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn sample_config_parses() {
        let config: TripmindConfig =
            toml::from_str(include_str!("../../../config/tripmind.toml")).unwrap();
        assert_eq!(config.cache.weather_ttl_seconds(), 900);
        assert_eq!(config.geocoding, TripmindConfig::default().geocoding);
    }

    #[test]
    fn builds_from_default_config() {
        assert!(build_orchestrator(&TripmindConfig::default()).is_ok());
    }
}
