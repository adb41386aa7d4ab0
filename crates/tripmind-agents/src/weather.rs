use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use tripmind_cache::{coordinate_key, TtlCache};
use tripmind_models::{GeoPoint, WeatherResult};

use crate::error::TripError;
use crate::provider::{CurrentWeather, WeatherProvider};
use crate::retry::RetryPolicy;

pub const WEATHER_STAGE: &str = "weather";

/// Current conditions for a point, cached by rounded coordinates.
pub struct WeatherStage {
    provider: Arc<dyn WeatherProvider>,
    cache: Arc<TtlCache<WeatherResult>>,
    retry: RetryPolicy,
    ttl: Duration,
}

impl WeatherStage {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        cache: Arc<TtlCache<WeatherResult>>,
        retry: RetryPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            retry,
            ttl,
        }
    }

    pub async fn fetch(&self, point: &GeoPoint) -> Result<WeatherResult, TripError> {
        let key = coordinate_key(WEATHER_STAGE, point.latitude, point.longitude);
        if let Some(result) = self.cache.get(&key).await {
            debug!(key = %key, "Weather cache hit");
            return Ok(result);
        }

        let raw = self
            .retry
            .run(WEATHER_STAGE, || {
                self.provider.current(point.latitude, point.longitude)
            })
            .await?;
        let result = normalize(raw)?;

        info!(
            provider = self.provider.name(),
            temperature_c = result.temperature_c,
            precipitation_pct = result.precipitation_probability_pct,
            "Fetched weather"
        );
        self.cache.set(key, result.clone(), self.ttl).await;
        Ok(result)
    }
}

/// Round temperature to whole degrees and clamp precipitation into 0..=100.
pub fn normalize(raw: CurrentWeather) -> Result<WeatherResult, TripError> {
    if !raw.temperature.is_finite() {
        return Err(TripError::Upstream(format!(
            "Invalid temperature: {}",
            raw.temperature
        )));
    }
    let precipitation = raw
        .precipitation_probability
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
        .round()
        .clamp(0.0, 100.0) as u8;

    Ok(WeatherResult {
        temperature_c: raw.temperature.round(),
        precipitation_probability_pct: precipitation,
        condition_text: raw.condition_text,
    })
}
