use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use svodka_core::{
    ports::{CurrentWeather, DayForecast, WeatherPort},
    Error, Result,
};

use crate::send_with_retry;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const ONE_CALL_PATH: &str = "/data/3.0/onecall";

/// Paid-tier guard: One Call 3.0 bills past 1000 calls/day.
const MAX_DAILY_REQUESTS: u32 = 999;

/// OpenWeatherMap One Call 3.0 client for a fixed location.
pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_key: String,
    lat: String,
    lon: String,
    base_url: String,
    budget: Mutex<RequestBudget>,
}

/// Calls made on a given local date; resets when the date changes.
#[derive(Debug)]
struct RequestBudget {
    day: NaiveDate,
    used: u32,
}

impl RequestBudget {
    fn try_acquire(&mut self, today: NaiveDate) -> bool {
        if today != self.day {
            self.day = today;
            self.used = 0;
        }
        if self.used >= MAX_DAILY_REQUESTS {
            return false;
        }
        self.used += 1;
        true
    }
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: CurrentPayload,
    daily: Vec<DailyPayload>,
}

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    wind_speed: f64,
    weather: Vec<ConditionPayload>,
}

#[derive(Debug, Deserialize)]
struct DailyPayload {
    temp: DailyTemp,
    #[serde(default)]
    pop: f64,
    weather: Vec<ConditionPayload>,
}

#[derive(Debug, Deserialize)]
struct DailyTemp {
    morn: f64,
    day: f64,
    eve: f64,
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionPayload {
    description: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, lat: impl Into<String>, lon: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: crate::http_client()?,
            api_key: api_key.into(),
            lat: lat.into(),
            lon: lon.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            budget: Mutex::new(RequestBudget {
                day: Local::now().date_naive(),
                used: 0,
            }),
        })
    }

    async fn fetch(&self) -> Result<OneCallResponse> {
        {
            let mut budget = self.budget.lock().unwrap_or_else(|e| e.into_inner());
            if !budget.try_acquire(Local::now().date_naive()) {
                return Err(Error::provider(
                    "openweathermap",
                    format!("daily request limit reached ({MAX_DAILY_REQUESTS})"),
                ));
            }
        }

        let url = format!("{}{}", self.base_url, ONE_CALL_PATH);
        let resp = send_with_retry(|| {
            self.http.get(&url).query(&[
                ("lat", self.lat.as_str()),
                ("lon", self.lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("exclude", "minutely,hourly,alerts"),
                ("units", "metric"),
            ])
        })
        .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::provider(
                "openweathermap",
                format!("one call returned status {status}"),
            ));
        }

        Ok(resp.json().await?)
    }
}

fn description(conditions: &[ConditionPayload]) -> String {
    conditions
        .first()
        .map(|c| c.description.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl WeatherPort for OpenWeatherClient {
    async fn current(&self) -> Result<CurrentWeather> {
        let data = self.fetch().await?;
        Ok(CurrentWeather {
            description: description(&data.current.weather),
            temp_c: data.current.temp,
            feels_like_c: data.current.feels_like,
            humidity: data.current.humidity,
            wind_speed_ms: data.current.wind_speed,
        })
    }

    async fn today(&self) -> Result<DayForecast> {
        let data = self.fetch().await?;
        let today = data
            .daily
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider("openweathermap", "response has no daily forecast"))?;
        Ok(DayForecast {
            description: description(&today.weather),
            morning_c: today.temp.morn,
            day_c: today.temp.day,
            evening_c: today.temp.eve,
            min_c: today.temp.min,
            max_c: today.temp.max,
            precipitation: today.pop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "lat": 55.14,
        "lon": 27.68,
        "timezone": "Europe/Minsk",
        "current": {
            "dt": 1750406400,
            "temp": 21.4,
            "feels_like": 20.9,
            "humidity": 56,
            "wind_speed": 3.2,
            "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds"}]
        },
        "daily": [{
            "dt": 1750413600,
            "temp": {"morn": 16.1, "day": 22.3, "eve": 19.8, "night": 14.0, "min": 13.5, "max": 23.0},
            "pop": 0.2,
            "weather": [{"id": 500, "main": "Rain", "description": "light rain"}]
        }]
    }"#;

    #[test]
    fn one_call_response_parses_needed_fields() {
        let parsed: OneCallResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(parsed.current.humidity, 56);
        assert_eq!(description(&parsed.current.weather), "scattered clouds");
        assert_eq!(parsed.daily[0].temp.max, 23.0);
        assert_eq!(parsed.daily[0].pop, 0.2);
    }

    #[test]
    fn budget_resets_on_a_new_day() {
        let day1 = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let mut budget = RequestBudget { day: day1, used: 0 };

        for _ in 0..MAX_DAILY_REQUESTS {
            assert!(budget.try_acquire(day1));
        }
        assert!(!budget.try_acquire(day1));
        assert!(budget.try_acquire(day2));
    }
}
