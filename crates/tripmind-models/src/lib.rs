pub mod config;
pub mod geo;
pub mod trip_request;
pub mod trip_result;

pub use config::{
    CacheConfig, GeocodingConfig, OrchestratorConfig, PlacesConfig, RetryConfig, TripmindConfig,
    WeatherConfig,
};
pub use geo::{GeoPoint, InvalidCoordinates};
pub use trip_request::{Intent, PlanTripRequest, MAX_LOCATION_TEXT_CHARS};
pub use trip_result::{PlacesResult, PlanTripResult, WeatherResult, MAX_PLACES};
