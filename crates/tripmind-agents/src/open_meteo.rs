use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tripmind_models::WeatherConfig;

use crate::error::TripError;
use crate::http::{build_client, check_status};
use crate::provider::{CurrentWeather, WeatherProvider};

const CURRENT_FIELDS: &str = "temperature_2m,precipitation_probability,weather_code";

/// Current conditions from the Open-Meteo forecast API (no key required).
pub struct OpenMeteoWeather {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    precipitation_probability: Option<f64>,
    weather_code: Option<i64>,
}

impl OpenMeteoWeather {
    pub fn new(
        config: &WeatherConfig,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, TripError> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            base_url: config.base_url.clone(),
        })
    }
}

/// Human-readable condition for a WMO weather interpretation code.
pub fn condition_from_wmo(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 | 2 => "Partly cloudy",
        3 => "Cloudy",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 | 66 | 67 => "Sleet",
        61 | 63 | 80 => "Rain",
        65 | 81 | 82 => "Heavy rain",
        71 | 73 | 75 | 77 | 85 | 86 => "Snow",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Unknown",
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather, TripError> {
        debug!(latitude, longitude, "Open-Meteo current conditions");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("temperature_unit", "celsius".to_string()),
            ])
            .send()
            .await?;

        let body: ForecastResponse = check_status(self.name(), response).await?.json().await?;
        let current = body.current.ok_or_else(|| {
            TripError::Upstream("Open-Meteo response has no current block".to_string())
        })?;
        let temperature = current.temperature_2m.ok_or_else(|| {
            TripError::Upstream("Open-Meteo response has no temperature".to_string())
        })?;

        Ok(CurrentWeather {
            temperature,
            precipitation_probability: current.precipitation_probability,
            condition_text: current
                .weather_code
                .map(condition_from_wmo)
                .unwrap_or("Unknown")
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenMeteoWeather {
        let config = WeatherConfig {
            base_url: format!("{}/v1/forecast", server.uri()),
        };
        OpenMeteoWeather::new(&config, "tripmind-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn wmo_codes_map_to_conditions() {
        assert_eq!(condition_from_wmo(0), "Clear");
        assert_eq!(condition_from_wmo(2), "Partly cloudy");
        assert_eq!(condition_from_wmo(48), "Fog");
        assert_eq!(condition_from_wmo(63), "Rain");
        assert_eq!(condition_from_wmo(82), "Heavy rain");
        assert_eq!(condition_from_wmo(67), "Sleet");
        assert_eq!(condition_from_wmo(75), "Snow");
        assert_eq!(condition_from_wmo(99), "Thunderstorm");
        assert_eq!(condition_from_wmo(12), "Unknown");
    }

    #[tokio::test]
    async fn parses_current_block() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("current", CURRENT_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 48.86,
                "longitude": 2.35,
                "current": {
                    "time": "2026-10-17T12:00",
                    "temperature_2m": 18.4,
                    "precipitation_probability": 20,
                    "weather_code": 0
                }
            })))
            .mount(&server)
            .await;

        let weather = provider(&server).current(48.86, 2.35).await.unwrap();
        assert_eq!(weather.temperature, 18.4);
        assert_eq!(weather.precipitation_probability, Some(20.0));
        assert_eq!(weather.condition_text, "Clear");
    }

    #[tokio::test]
    async fn missing_current_block_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 48.86,
                "longitude": 2.35
            })))
            .mount(&server)
            .await;

        let err = provider(&server).current(48.86, 2.35).await.unwrap_err();
        assert!(matches!(err, TripError::Upstream(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).current(48.86, 2.35).await.unwrap_err();
        assert!(err.is_transient());
    }
}
