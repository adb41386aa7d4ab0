use thiserror::Error;

#[derive(Error, Debug)]
pub enum TripError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Upstream rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TripError {
    /// Whether a stage should try the upstream call again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TripError::Upstream(_) | TripError::RateLimited(_) | TripError::Json(_)
        )
    }

    /// Text shown to the end user in `PlanTripResult::error_message`.
    pub fn user_message(&self) -> String {
        match self {
            TripError::Validation(reason) => reason.clone(),
            TripError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            TripError::Upstream(_) | TripError::Json(_) => {
                "Location services are temporarily unavailable. Please try again.".to_string()
            }
            TripError::RateLimited(_) => {
                "Too many requests. Please try again in a moment.".to_string()
            }
            TripError::Timeout(_) => {
                "The request took too long to complete. Please try again.".to_string()
            }
            TripError::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

/// Shown when the query does not resolve to any known place.
pub const NOT_FOUND_MESSAGE: &str = "I don't know this place exists";

impl From<reqwest::Error> for TripError {
    fn from(e: reqwest::Error) -> Self {
        TripError::Upstream(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upstream_failures_are_transient() {
        assert!(TripError::Upstream("502".to_string()).is_transient());
        assert!(TripError::RateLimited("429".to_string()).is_transient());
        assert!(!TripError::NotFound("XYZ123".to_string()).is_transient());
        assert!(!TripError::Validation("empty".to_string()).is_transient());
        assert!(!TripError::Cancelled.is_transient());
    }

    #[test]
    fn user_messages_distinguish_not_found_from_unavailable() {
        let not_found = TripError::NotFound("XYZ123".to_string()).user_message();
        let upstream = TripError::Upstream("connection reset".to_string()).user_message();

        assert_eq!(not_found, NOT_FOUND_MESSAGE);
        assert!(upstream.contains("try again"));
        assert_ne!(not_found, upstream);
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = TripError::Validation("Location cannot be empty".to_string());
        assert_eq!(err.user_message(), "Location cannot be empty");
    }
}
