//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::GEO_REQUEST_TIMEOUT_SECS;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for IP geolocation lookups.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client() -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(GEO_REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("dane_webperf/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(Arc::new(client))
}
