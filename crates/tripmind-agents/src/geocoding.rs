use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use tripmind_cache::{text_key, TtlCache};
use tripmind_models::GeoPoint;

use crate::error::TripError;
use crate::provider::Geocoder;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;

pub const GEOCODE_STAGE: &str = "geocode";

/// Resolves place text to a point: cache, then a paced and retried upstream lookup.
pub struct GeocodingStage {
    geocoder: Arc<dyn Geocoder>,
    cache: Arc<TtlCache<GeoPoint>>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    ttl: Duration,
}

impl GeocodingStage {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        cache: Arc<TtlCache<GeoPoint>>,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            geocoder,
            cache,
            limiter,
            retry,
            ttl,
        }
    }

    /// Fails with `NotFound` when the upstream has no candidate (not retried),
    /// or with the last transient error once retries run out.
    pub async fn resolve(&self, location_text: &str) -> Result<GeoPoint, TripError> {
        let text = location_text.trim();
        let key = text_key(GEOCODE_STAGE, text);
        if let Some(point) = self.cache.get(&key).await {
            debug!(key = %key, "Geocode cache hit");
            return Ok(point);
        }
        debug!(key = %key, "Geocode cache miss");

        // Every attempt, retries included, goes through the limiter.
        let candidates = self
            .retry
            .run(GEOCODE_STAGE, || async {
                self.limiter.acquire().await;
                self.geocoder.lookup(text).await
            })
            .await?;

        let Some(point) = candidates.into_iter().next() else {
            warn!(query = text, geocoder = self.geocoder.name(), "Location not found");
            return Err(TripError::NotFound(text.to_string()));
        };

        info!(
            query = text,
            latitude = point.latitude,
            longitude = point.longitude,
            display_name = %point.display_name,
            "Geocoded location"
        );
        self.cache.set(key, point.clone(), self.ttl).await;
        Ok(point)
    }
}
