//! Scripted providers for exercising the orchestrator without network access.
//!
//! Each fake replays a queue of scripted replies and then repeats a fallback
//! reply forever. Calls are counted so tests can assert how often an upstream
//! was hit (e.g. that a cache hit skipped it entirely).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tripmind_models::{GeoPoint, TripmindConfig};

use crate::error::TripError;
use crate::orchestrator::Orchestrator;
use crate::provider::{CurrentWeather, Geocoder, NamedPoint, PlacesProvider, WeatherProvider};

/// One scripted upstream answer.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Upstream,
    RateLimited,
}

impl<T> Reply<T> {
    fn into_result(self, upstream: &str) -> Result<T, TripError> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Upstream => Err(TripError::Upstream(format!("{upstream}: scripted failure"))),
            Reply::RateLimited => Err(TripError::RateLimited(format!("{upstream}: scripted 429"))),
        }
    }
}

struct Script<T> {
    queue: Mutex<VecDeque<Reply<T>>>,
    fallback: Reply<T>,
    calls: AtomicUsize,
    latency: Duration,
}

impl<T: Clone> Script<T> {
    fn new(queued: Vec<Reply<T>>, fallback: Reply<T>) -> Self {
        Self {
            queue: Mutex::new(queued.into()),
            fallback,
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    async fn next(&self, upstream: &str) -> Result<T, TripError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let reply = self
            .queue
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.into_result(upstream)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub struct ScriptedGeocoder {
    script: Script<Vec<GeoPoint>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedGeocoder {
    pub fn with_replies(
        queued: Vec<Reply<Vec<GeoPoint>>>,
        fallback: Reply<Vec<GeoPoint>>,
    ) -> Self {
        Self {
            script: Script::new(queued, fallback),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Always resolves to `point`.
    pub fn resolving(point: GeoPoint) -> Self {
        Self::with_replies(vec![], Reply::Ok(vec![point]))
    }

    /// Always answers with no candidates.
    pub fn not_found() -> Self {
        Self::with_replies(vec![], Reply::Ok(vec![]))
    }

    pub fn failing() -> Self {
        Self::with_replies(vec![], Reply::Upstream)
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }

    /// Texts passed to `lookup`, in call order.
    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    fn name(&self) -> &str {
        "scripted-geocoder"
    }

    async fn lookup(&self, text: &str) -> Result<Vec<GeoPoint>, TripError> {
        self.queries.lock().await.push(text.to_string());
        self.script.next(self.name()).await
    }
}

pub struct ScriptedWeather {
    script: Script<CurrentWeather>,
}

impl ScriptedWeather {
    pub fn with_replies(
        queued: Vec<Reply<CurrentWeather>>,
        fallback: Reply<CurrentWeather>,
    ) -> Self {
        Self {
            script: Script::new(queued, fallback),
        }
    }

    pub fn returning(weather: CurrentWeather) -> Self {
        Self::with_replies(vec![], Reply::Ok(weather))
    }

    pub fn failing() -> Self {
        Self::with_replies(vec![], Reply::Upstream)
    }

    /// Each call takes `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.script.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl WeatherProvider for ScriptedWeather {
    fn name(&self) -> &str {
        "scripted-weather"
    }

    async fn current(&self, _latitude: f64, _longitude: f64) -> Result<CurrentWeather, TripError> {
        self.script.next(self.name()).await
    }
}

pub struct ScriptedPlaces {
    script: Script<Vec<NamedPoint>>,
}

impl ScriptedPlaces {
    pub fn with_replies(
        queued: Vec<Reply<Vec<NamedPoint>>>,
        fallback: Reply<Vec<NamedPoint>>,
    ) -> Self {
        Self {
            script: Script::new(queued, fallback),
        }
    }

    pub fn returning(points: Vec<NamedPoint>) -> Self {
        Self::with_replies(vec![], Reply::Ok(points))
    }

    pub fn failing() -> Self {
        Self::with_replies(vec![], Reply::Upstream)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.script.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl PlacesProvider for ScriptedPlaces {
    fn name(&self) -> &str {
        "scripted-places"
    }

    async fn nearby(
        &self,
        _latitude: f64,
        _longitude: f64,
        _radius_meters: u32,
    ) -> Result<Vec<NamedPoint>, TripError> {
        self.script.next(self.name()).await
    }
}

/// Named points at the origin, one per name, in the given order.
pub fn named_points(names: &[&str]) -> Vec<NamedPoint> {
    names
        .iter()
        .map(|name| NamedPoint {
            name: Some(name.to_string()),
            latitude: 0.0,
            longitude: 0.0,
            kind: Some("attraction".to_string()),
        })
        .collect()
}

pub fn current_weather(temperature: f64, precipitation: f64, condition: &str) -> CurrentWeather {
    CurrentWeather {
        temperature,
        precipitation_probability: Some(precipitation),
        condition_text: condition.to_string(),
    }
}

/// Orchestrator over the given fakes with default configuration.
pub fn orchestrator(
    geocoder: &Arc<ScriptedGeocoder>,
    weather: &Arc<ScriptedWeather>,
    places: &Arc<ScriptedPlaces>,
) -> Orchestrator {
    orchestrator_with_config(geocoder, weather, places, &TripmindConfig::default())
}

pub fn orchestrator_with_config(
    geocoder: &Arc<ScriptedGeocoder>,
    weather: &Arc<ScriptedWeather>,
    places: &Arc<ScriptedPlaces>,
    config: &TripmindConfig,
) -> Orchestrator {
    Orchestrator::with_providers(
        Arc::clone(geocoder) as Arc<dyn Geocoder>,
        Arc::clone(weather) as Arc<dyn WeatherProvider>,
        Arc::clone(places) as Arc<dyn PlacesProvider>,
        config,
    )
}
