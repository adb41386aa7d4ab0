pub mod error;
pub mod geocoding;
mod http;
pub mod intent;
pub mod nominatim;
pub mod open_meteo;
pub mod orchestrator;
pub mod overpass;
pub mod places;
pub mod provider;
pub mod rate_limit;
pub mod retry;
pub mod weather;

pub mod test_support;

pub use error::TripError;
pub use geocoding::GeocodingStage;
pub use intent::IntentClassifier;
pub use nominatim::NominatimGeocoder;
pub use open_meteo::OpenMeteoWeather;
pub use orchestrator::{compose_summary, Orchestrator, Phase};
pub use overpass::OverpassPlaces;
pub use places::PlacesStage;
pub use provider::{CurrentWeather, Geocoder, NamedPoint, PlacesProvider, WeatherProvider};
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use weather::WeatherStage;
