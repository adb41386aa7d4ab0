use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use tripmind_cache::{coordinate_key, TtlCache};
use tripmind_models::{GeoPoint, PlacesResult, MAX_PLACES};

use crate::error::TripError;
use crate::provider::{NamedPoint, PlacesProvider};
use crate::retry::RetryPolicy;

pub const PLACES_STAGE: &str = "places";

/// Attractions around a point, cached by rounded coordinates and radius.
pub struct PlacesStage {
    provider: Arc<dyn PlacesProvider>,
    cache: Arc<TtlCache<PlacesResult>>,
    retry: RetryPolicy,
    ttl: Duration,
    radius_meters: u32,
}

impl PlacesStage {
    pub fn new(
        provider: Arc<dyn PlacesProvider>,
        cache: Arc<TtlCache<PlacesResult>>,
        retry: RetryPolicy,
        ttl: Duration,
        radius_meters: u32,
    ) -> Self {
        Self {
            provider,
            cache,
            retry,
            ttl,
            radius_meters,
        }
    }

    /// An area with no named attractions yields an empty `PlacesResult`, not an error.
    pub async fn fetch(&self, point: &GeoPoint) -> Result<PlacesResult, TripError> {
        let key = format!(
            "{}:{}",
            coordinate_key(PLACES_STAGE, point.latitude, point.longitude),
            self.radius_meters
        );
        if let Some(result) = self.cache.get(&key).await {
            debug!(key = %key, "Places cache hit");
            return Ok(result);
        }

        let points = self
            .retry
            .run(PLACES_STAGE, || {
                self.provider
                    .nearby(point.latitude, point.longitude, self.radius_meters)
            })
            .await?;
        let candidates = points.len();
        let result = select_names(points);

        info!(
            provider = self.provider.name(),
            candidates,
            selected = result.names.len(),
            "Fetched places"
        );
        self.cache.set(key, result.clone(), self.ttl).await;
        Ok(result)
    }
}

/// Trimmed, non-blank, first-occurrence-wins names, capped at `MAX_PLACES`,
/// in the order the provider returned them.
pub fn select_names(points: Vec<NamedPoint>) -> PlacesResult {
    let mut seen = HashSet::new();
    let names = points
        .into_iter()
        .filter_map(|p| p.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .take(MAX_PLACES)
        .collect();
    PlacesResult { names }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: Option<&str>) -> NamedPoint {
        NamedPoint {
            name: name.map(str::to_string),
            latitude: 0.0,
            longitude: 0.0,
            kind: None,
        }
    }

    #[test]
    fn truncates_to_five_in_order() {
        let points = (1..=12).map(|i| named(Some(&format!("Spot {i}")))).collect();
        let result = select_names(points);
        assert_eq!(
            result.names,
            vec!["Spot 1", "Spot 2", "Spot 3", "Spot 4", "Spot 5"]
        );
    }

    #[test]
    fn drops_blank_and_duplicate_names() {
        let points = vec![
            named(Some("Colosseum")),
            named(None),
            named(Some("   ")),
            named(Some(" Colosseum ")),
            named(Some("Pantheon")),
        ];
        let result = select_names(points);
        assert_eq!(result.names, vec!["Colosseum", "Pantheon"]);
    }

    #[test]
    fn nothing_named_is_empty_result() {
        let result = select_names(vec![named(None), named(None)]);
        assert!(result.names.is_empty());
    }
}
