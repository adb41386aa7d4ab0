use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trip_request::Intent;

/// Upper bound on attraction names returned for one place.
pub const MAX_PLACES: usize = 5;

/// Current conditions at a geocoded point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherResult {
    /// Rounded to whole degrees.
    pub temperature_c: f64,
    /// 0 to 100.
    pub precipitation_probability_pct: u8,
    pub condition_text: String,
}

/// Attractions near a geocoded point, in upstream display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlacesResult {
    /// At most `MAX_PLACES` entries. Empty means "nothing found", not a failure.
    pub names: Vec<String>,
}

/// The single output of a plan-trip call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanTripResult {
    pub request_id: Uuid,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Resolved display name of the place, once geocoding succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub places: Option<PlacesResult>,
    /// Human-readable text built from the stages that succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

impl PlanTripResult {
    /// A failed result carrying only the user-facing message.
    pub fn failure(
        request_id: Uuid,
        intent: Option<Intent>,
        message: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            request_id,
            success: false,
            intent,
            location: None,
            weather: None,
            places: None,
            summary: None,
            error_message: Some(message.into()),
            completed_at: Utc::now(),
            processing_time_ms,
        }
    }
}
