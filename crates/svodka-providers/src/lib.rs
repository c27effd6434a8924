//! HTTP clients for the external data providers.
//!
//! Both clients share the same policy: a 5 second request timeout and exactly
//! one retry on a transport-level failure. HTTP error statuses are not
//! retried; they map to `Error::Provider`.

use std::time::Duration;

use svodka_core::{Error, Result};

pub mod currency;
pub mod weather;

pub use currency::NbrbCurrencyClient;
pub use weather::OpenWeatherClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_DELAY: Duration = Duration::from_millis(100);

pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Issue the request built by `build`, retrying once on a transport error.
pub(crate) async fn send_with_retry(
    build: impl Fn() -> reqwest::RequestBuilder,
) -> Result<reqwest::Response> {
    match build().send().await {
        Ok(resp) => Ok(resp),
        Err(first) => {
            tracing::debug!(error = %first, "request failed, retrying once");
            tokio::time::sleep(RETRY_DELAY).await;
            build().send().await.map_err(Error::from)
        }
    }
}
