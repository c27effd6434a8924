use async_trait::async_trait;
use serde::Deserialize;

use svodka_core::{
    ports::{CurrencyCode, CurrencyPort},
    Error, Result,
};

use crate::send_with_retry;

const DEFAULT_BASE_URL: &str = "https://api.nbrb.by";

/// Official NBRB exchange rates (BYN per unit of foreign currency).
pub struct NbrbCurrencyClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(rename = "Cur_OfficialRate")]
    official_rate: f64,
}

impl NbrbCurrencyClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: crate::http_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    fn rate_url(&self, code: CurrencyCode) -> String {
        // parammode=2 selects lookup by currency abbreviation.
        format!("{}/exrates/rates/{code}?parammode=2", self.base_url)
    }
}

#[async_trait]
impl CurrencyPort for NbrbCurrencyClient {
    async fn official_rate(&self, code: CurrencyCode) -> Result<f64> {
        let url = self.rate_url(code);
        let resp = send_with_retry(|| self.http.get(&url)).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::provider(
                "nbrb",
                format!("rate lookup for {code} returned status {status}"),
            ));
        }

        let body: RateResponse = resp.json().await?;
        Ok(body.official_rate)
    }
}
