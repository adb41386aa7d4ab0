use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::warn;

use crate::error::TripError;

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, TripError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| TripError::Upstream(format!("Failed to build HTTP client: {e}")))
}

/// Map a non-2xx response onto the error taxonomy.
pub(crate) async fn check_status(
    upstream: &str,
    response: Response,
) -> Result<Response, TripError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(upstream, status = %status, "Upstream returned an error status");
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TripError::RateLimited(format!("{upstream} returned {status}")));
    }
    Err(TripError::Upstream(format!(
        "{upstream} returned {status}: {}",
        body.chars().take(200).collect::<String>()
    )))
}
