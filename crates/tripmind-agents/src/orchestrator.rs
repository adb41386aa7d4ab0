use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tripmind_cache::TtlCache;
use tripmind_models::{
    GeoPoint, Intent, OrchestratorConfig, PlacesResult, PlanTripRequest, PlanTripResult,
    TripmindConfig, WeatherResult,
};
use uuid::Uuid;

use crate::error::TripError;
use crate::geocoding::GeocodingStage;
use crate::intent::IntentClassifier;
use crate::places::PlacesStage;
use crate::provider::{Geocoder, PlacesProvider, WeatherProvider};
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::weather::WeatherStage;

/// Lifecycle of one plan-trip call. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Classifying,
    Geocoding,
    Fetching,
    Aggregating,
    Done,
}

/// What a spawned fetch task hands back.
enum StageOutput {
    Weather(Result<WeatherResult, TripError>),
    Places(Result<PlacesResult, TripError>),
}

/// Outcome per requested stage; `None` means the stage was not requested.
struct FetchOutcomes {
    weather: Option<Result<WeatherResult, TripError>>,
    places: Option<Result<PlacesResult, TripError>>,
}

/// Classifies the query, geocodes it once, fans out to the stages the intent
/// asks for, and folds whatever came back into a single `PlanTripResult`.
pub struct Orchestrator {
    classifier: IntentClassifier,
    geocoding: Arc<GeocodingStage>,
    weather: Arc<WeatherStage>,
    places: Arc<PlacesStage>,
    total_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        geocoding: Arc<GeocodingStage>,
        weather: Arc<WeatherStage>,
        places: Arc<PlacesStage>,
        config: &OrchestratorConfig,
    ) -> Self {
        Self {
            classifier: IntentClassifier::default(),
            geocoding,
            weather,
            places,
            total_timeout: Duration::from_secs(config.total_timeout_seconds),
        }
    }

    /// Wire stages around the given providers with fresh caches and a fresh
    /// rate limiter, all sized and timed from `config`.
    pub fn with_providers(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherProvider>,
        places: Arc<dyn PlacesProvider>,
        config: &TripmindConfig,
    ) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        let ttl = Duration::from_secs(config.cache.ttl_seconds);
        let capacity = config.cache.max_capacity;
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs_f64(
            config.geocoding.min_interval_seconds.max(0.0).min(86_400.0),
        )));

        let geocoding = GeocodingStage::new(
            geocoder,
            Arc::new(TtlCache::new(capacity)),
            limiter,
            retry,
            ttl,
        );
        let weather = WeatherStage::new(
            weather,
            Arc::new(TtlCache::new(capacity)),
            retry,
            Duration::from_secs(config.cache.weather_ttl_seconds()),
        );
        let places = PlacesStage::new(
            places,
            Arc::new(TtlCache::new(capacity)),
            retry,
            ttl,
            config.places.radius_meters,
        );

        Self::new(
            Arc::new(geocoding),
            Arc::new(weather),
            Arc::new(places),
            &config.orchestrator,
        )
    }

    /// Plan a trip. Never fails: every error ends up in `error_message`.
    pub async fn plan_trip(&self, request: &PlanTripRequest) -> PlanTripResult {
        let start = Instant::now();
        info!(request_id = %request.id, query = %request.location_text, "Starting plan-trip");

        match tokio::time::timeout(self.total_timeout, self.run(request, start)).await {
            Ok(result) => result,
            Err(_) => {
                let err = TripError::Timeout(self.total_timeout.as_secs());
                warn!(request_id = %request.id, error = %err, "Plan-trip timed out");
                PlanTripResult::failure(request.id, None, err.user_message(), elapsed_ms(start))
            }
        }
    }

    /// Like `plan_trip`, but gives up as soon as `cancel` fires. In-flight stage
    /// tasks are aborted; cache writes already made are kept.
    pub async fn plan_trip_cancellable(
        &self,
        request: &PlanTripRequest,
        cancel: &CancellationToken,
    ) -> Result<PlanTripResult, TripError> {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(request_id = %request.id, "Plan-trip cancelled");
                Err(TripError::Cancelled)
            }
            result = self.plan_trip(request) => Ok(result),
        }
    }

    async fn run(&self, request: &PlanTripRequest, start: Instant) -> PlanTripResult {
        if let Err(reason) = request.validate() {
            let err = TripError::Validation(reason);
            warn!(request_id = %request.id, error = %err, "Rejected request");
            return PlanTripResult::failure(request.id, None, err.user_message(), elapsed_ms(start));
        }

        enter(request.id, Phase::Classifying);
        let intent = self.classifier.classify(&request.location_text);
        let place_text = self.classifier.place_text(&request.location_text);
        info!(request_id = %request.id, intent = ?intent, place = %place_text, "Intent analyzed");

        enter(request.id, Phase::Geocoding);
        let point = match self.geocoding.resolve(&place_text).await {
            Ok(point) => point,
            Err(e) => {
                match &e {
                    TripError::NotFound(_) => {
                        warn!(request_id = %request.id, place = %place_text, "Place not recognized")
                    }
                    _ => error!(request_id = %request.id, error = %e, "Geocoding failed"),
                }
                enter(request.id, Phase::Done);
                return PlanTripResult::failure(
                    request.id,
                    Some(intent),
                    e.user_message(),
                    elapsed_ms(start),
                );
            }
        };

        enter(request.id, Phase::Fetching);
        let outcomes = self.fetch(intent, point.clone()).await;

        enter(request.id, Phase::Aggregating);
        let result = aggregate(request.id, intent, &point, outcomes, elapsed_ms(start));

        enter(request.id, Phase::Done);
        info!(
            request_id = %request.id,
            success = result.success,
            has_weather = result.weather.is_some(),
            has_places = result.places.is_some(),
            elapsed_ms = result.processing_time_ms,
            "Plan-trip complete"
        );
        result
    }

    /// Run the requested stages concurrently and wait for all of them. A failing
    /// stage never cancels its sibling.
    async fn fetch(&self, intent: Intent, point: GeoPoint) -> FetchOutcomes {
        let point = Arc::new(point);
        let mut tasks = JoinSet::new();

        // Pre-filled so a panicked task still counts as a failed stage.
        let mut outcomes = FetchOutcomes {
            weather: None,
            places: None,
        };

        if intent.wants_weather() {
            outcomes.weather = Some(Err(TripError::Upstream("weather task failed".to_string())));
            let stage = Arc::clone(&self.weather);
            let point = Arc::clone(&point);
            tasks.spawn(async move { StageOutput::Weather(stage.fetch(&point).await) });
        }
        if intent.wants_places() {
            outcomes.places = Some(Err(TripError::Upstream("places task failed".to_string())));
            let stage = Arc::clone(&self.places);
            let point = Arc::clone(&point);
            tasks.spawn(async move { StageOutput::Places(stage.fetch(&point).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(StageOutput::Weather(result)) => outcomes.weather = Some(result),
                Ok(StageOutput::Places(result)) => outcomes.places = Some(result),
                Err(e) => error!(error = %e, "Stage task panicked"),
            }
        }

        outcomes
    }
}

fn enter(request_id: Uuid, phase: Phase) {
    debug!(request_id = %request_id, phase = ?phase, "Phase transition");
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Build the final result. Success when at least one requested stage succeeded;
/// a failed stage's field is simply left out.
fn aggregate(
    request_id: Uuid,
    intent: Intent,
    point: &GeoPoint,
    outcomes: FetchOutcomes,
    processing_time_ms: u64,
) -> PlanTripResult {
    let weather = match outcomes.weather {
        Some(Ok(weather)) => Some(weather),
        Some(Err(e)) => {
            warn!(request_id = %request_id, error = %e, "Weather stage failed");
            None
        }
        None => None,
    };
    let places = match outcomes.places {
        Some(Ok(places)) => Some(places),
        Some(Err(e)) => {
            warn!(request_id = %request_id, error = %e, "Places stage failed");
            None
        }
        None => None,
    };

    if weather.is_none() && places.is_none() {
        let mut result = PlanTripResult::failure(
            request_id,
            Some(intent),
            all_stages_failed_message(intent),
            processing_time_ms,
        );
        result.location = Some(point.display_name.clone());
        return result;
    }

    PlanTripResult {
        request_id,
        success: true,
        intent: Some(intent),
        location: Some(point.display_name.clone()),
        summary: Some(compose_summary(point.city(), weather.as_ref(), places.as_ref())),
        weather,
        places,
        error_message: None,
        completed_at: Utc::now(),
        processing_time_ms,
    }
}

fn all_stages_failed_message(intent: Intent) -> String {
    let what = match intent {
        Intent::Weather => "weather information",
        Intent::Places => "places information",
        Intent::Both => "weather or places information",
    };
    format!("Unable to fetch {what} at the moment. Please try again.")
}

/// Human-readable text from whichever stages produced data.
pub fn compose_summary(
    city: &str,
    weather: Option<&WeatherResult>,
    places: Option<&PlacesResult>,
) -> String {
    let mut parts = Vec::new();

    if let Some(weather) = weather {
        parts.push(format!(
            "In {city} it's currently {}°C with a chance of {}% to rain.",
            weather.temperature_c, weather.precipitation_probability_pct
        ));
    }

    if let Some(places) = places {
        if places.names.is_empty() {
            parts.push(format!("I couldn't find tourist attractions in {city}."));
        } else {
            let list = places
                .names
                .iter()
                .map(|name| format!("- {name}"))
                .collect::<Vec<_>>()
                .join("\n");
            parts.push(format!("In {city} these are the places you can go,\n\n{list}"));
        }
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> GeoPoint {
        GeoPoint::new(48.8566, 2.3522, "Paris, Ile-de-France, France").unwrap()
    }

    fn sunny() -> WeatherResult {
        WeatherResult {
            temperature_c: 18.0,
            precipitation_probability_pct: 20,
            condition_text: "Clear".to_string(),
        }
    }

    #[test]
    fn summary_for_weather_only() {
        let summary = compose_summary("Paris", Some(&sunny()), None);
        assert_eq!(
            summary,
            "In Paris it's currently 18°C with a chance of 20% to rain."
        );
    }

    #[test]
    fn summary_lists_places() {
        let places = PlacesResult {
            names: vec!["Louvre".to_string(), "Eiffel Tower".to_string()],
        };
        let summary = compose_summary("Paris", None, Some(&places));
        assert_eq!(
            summary,
            "In Paris these are the places you can go,\n\n- Louvre\n- Eiffel Tower"
        );
    }

    #[test]
    fn summary_for_empty_places() {
        let summary = compose_summary("Paris", None, Some(&PlacesResult::default()));
        assert_eq!(summary, "I couldn't find tourist attractions in Paris.");
    }

    #[test]
    fn aggregate_partial_success_drops_failed_field() {
        let outcomes = FetchOutcomes {
            weather: Some(Err(TripError::Upstream("503".to_string()))),
            places: Some(Ok(PlacesResult {
                names: vec!["Louvre".to_string()],
            })),
        };

        let result = aggregate(Uuid::new_v4(), Intent::Both, &paris(), outcomes, 5);
        assert!(result.success);
        assert!(result.weather.is_none());
        assert_eq!(result.places.unwrap().names, vec!["Louvre"]);
        assert!(result.error_message.is_none());
        assert!(!result.summary.unwrap().contains("°C"));
    }

    #[test]
    fn aggregate_all_failed_is_failure() {
        let outcomes = FetchOutcomes {
            weather: Some(Err(TripError::Upstream("503".to_string()))),
            places: Some(Err(TripError::RateLimited("429".to_string()))),
        };

        let result = aggregate(Uuid::new_v4(), Intent::Both, &paris(), outcomes, 5);
        assert!(!result.success);
        assert!(result.weather.is_none() && result.places.is_none());
        assert_eq!(
            result.error_message.as_deref(),
            Some("Unable to fetch weather or places information at the moment. Please try again.")
        );
        assert_eq!(result.location.as_deref(), Some("Paris, Ile-de-France, France"));
    }

    #[test]
    fn aggregate_single_stage_intent() {
        let outcomes = FetchOutcomes {
            weather: Some(Ok(sunny())),
            places: None,
        };

        let result = aggregate(Uuid::new_v4(), Intent::Weather, &paris(), outcomes, 5);
        assert!(result.success);
        assert_eq!(result.intent, Some(Intent::Weather));
        assert!(result.places.is_none());
        assert_eq!(result.weather.unwrap().temperature_c, 18.0);
    }
}
