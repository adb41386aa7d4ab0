use serde::{Deserialize, Serialize};

/// Top-level configuration for TripMind. Every section and field has a default,
/// so a partial TOML file is enough.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TripmindConfig {
    pub cache: CacheConfig,
    pub geocoding: GeocodingConfig,
    pub retry: RetryConfig,
    pub weather: WeatherConfig,
    pub places: PlacesConfig,
    pub orchestrator: OrchestratorConfig,
}

/// In-memory cache shared by all stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries per stage cache.
    pub max_capacity: u64,
    /// Default time-to-live for cached stage results.
    pub ttl_seconds: u64,
    /// Override for weather entries, which go stale faster. Falls back to `ttl_seconds`.
    pub weather_ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl_seconds: 3600,
            weather_ttl_seconds: None,
        }
    }
}

impl CacheConfig {
    pub fn weather_ttl_seconds(&self) -> u64 {
        self.weather_ttl_seconds.unwrap_or(self.ttl_seconds)
    }
}

/// Geocoding upstream (Nominatim search).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Minimum spacing between upstream calls, process-wide.
    pub min_interval_seconds: f64,
    pub base_url: String,
    pub user_agent: String,
    /// Contact address sent with each request, as the usage policy asks.
    pub email: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            min_interval_seconds: 1.0,
            base_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "tripmind/0.1".to_string(),
            email: "demo@example.com".to_string(),
        }
    }
}

/// Retry policy applied independently by each stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that.
    pub base_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacesConfig {
    pub base_url: String,
    /// Search radius around the geocoded point.
    pub radius_meters: u32,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://overpass-api.de/api/interpreter".to_string(),
            radius_meters: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Upper bound on a whole plan-trip call, retries and pacing included.
    pub total_timeout_seconds: u64,
    /// Per upstream HTTP call.
    pub request_timeout_seconds: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            total_timeout_seconds: 30,
            request_timeout_seconds: 10,
        }
    }
}
