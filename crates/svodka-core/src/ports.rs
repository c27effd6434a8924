use async_trait::async_trait;

use crate::Result;

/// Currencies the NBRB rate lookup supports. Anything else is rejected before
/// a request is made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrencyCode {
    Usd,
    Eur,
    Rub,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 3] = [CurrencyCode::Usd, CurrencyCode::Rub, CurrencyCode::Eur];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Rub => "RUB",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(CurrencyCode::Usd),
            "EUR" => Ok(CurrencyCode::Eur),
            "RUB" => Ok(CurrencyCode::Rub),
            _ => Err(()),
        }
    }
}

/// Port for the exchange-rate provider.
#[async_trait]
pub trait CurrencyPort: Send + Sync {
    /// Official rate of `code` in BYN.
    async fn official_rate(&self, code: CurrencyCode) -> Result<f64>;
}

/// Current conditions at the configured location.
#[derive(Clone, Debug)]
pub struct CurrentWeather {
    pub description: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity: u8,
    pub wind_speed_ms: f64,
}

/// Today's forecast at the configured location.
#[derive(Clone, Debug)]
pub struct DayForecast {
    pub description: String,
    pub morning_c: f64,
    pub day_c: f64,
    pub evening_c: f64,
    pub min_c: f64,
    pub max_c: f64,
    /// Probability of precipitation, 0.0..=1.0.
    pub precipitation: f64,
}

/// Port for the weather provider.
#[async_trait]
pub trait WeatherPort: Send + Sync {
    async fn current(&self) -> Result<CurrentWeather>;
    async fn today(&self) -> Result<DayForecast>;
}
