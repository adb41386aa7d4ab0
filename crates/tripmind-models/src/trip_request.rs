use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted query, in characters.
pub const MAX_LOCATION_TEXT_CHARS: usize = 200;

/// Which data a query asks for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Weather,
    Places,
    Both,
}

impl Intent {
    pub fn wants_weather(self) -> bool {
        matches!(self, Intent::Weather | Intent::Both)
    }

    pub fn wants_places(self) -> bool {
        matches!(self, Intent::Places | Intent::Both)
    }
}

/// A single "plan my trip" call as handed over by the front-end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanTripRequest {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Free-text query, e.g. "weather in Paris" or "Bangalore".
    #[serde(alias = "location")]
    pub location_text: String,
}

impl PlanTripRequest {
    pub fn new(location_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            location_text: location_text.into(),
        }
    }

    /// Check the query text before any stage runs. Returns the reason on rejection.
    pub fn validate(&self) -> Result<(), String> {
        let text = self.location_text.trim();
        if text.is_empty() {
            return Err("Location cannot be empty".to_string());
        }
        if text.chars().count() > MAX_LOCATION_TEXT_CHARS {
            return Err(format!(
                "Location must be at most {MAX_LOCATION_TEXT_CHARS} characters"
            ));
        }
        if text.chars().any(char::is_control) {
            return Err("Location contains control characters".to_string());
        }
        Ok(())
    }
}
