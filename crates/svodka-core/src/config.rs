use std::{env, fs, path::Path, str::FromStr, time::Duration};

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::{errors::Error, Result};

/// Typed configuration for the bot.
///
/// Everything comes from the environment; a `.env` file next to the binary is
/// loaded first if present (existing env vars win).
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub openweather_api_key: String,

    /// IANA time zone used to interpret `/remind` input, localize displayed
    /// timestamps and anchor the morning brief. The reminder store itself is
    /// timezone-agnostic.
    pub timezone: Tz,

    // Weather location
    pub weather_lat: String,
    pub weather_lon: String,

    // Background tasks
    pub reminder_check_period: Duration,
    pub reminder_send_timeout: Duration,
    pub brief_time: NaiveTime,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let openweather_api_key = env_str("OPENWEATHER_API_KEY").unwrap_or_default();
        if openweather_api_key.trim().is_empty() {
            return Err(Error::Config(
                "OPENWEATHER_API_KEY environment variable is required".to_string(),
            ));
        }

        let tz_name = env_str("BOT_TIMEZONE").unwrap_or_else(|| "Europe/Vilnius".to_string());
        let timezone = Tz::from_str(tz_name.trim())
            .map_err(|_| Error::Config(format!("unknown IANA time zone: {tz_name}")))?;

        let weather_lat = env_str("WEATHER_LAT").unwrap_or_else(|| "55.139235".to_string());
        let weather_lon = env_str("WEATHER_LON").unwrap_or_else(|| "27.6845787".to_string());

        let reminder_check_period =
            Duration::from_secs(env_u64("REMINDER_CHECK_SECS").unwrap_or(60));
        let reminder_send_timeout =
            Duration::from_secs(env_u64("REMINDER_SEND_TIMEOUT_SECS").unwrap_or(10));

        let brief_hour = env_u32("BRIEF_HOUR").unwrap_or(8);
        let brief_time = NaiveTime::from_hms_opt(brief_hour, 0, 0)
            .ok_or_else(|| Error::Config(format!("BRIEF_HOUR out of range: {brief_hour}")))?;

        Ok(Self {
            telegram_bot_token,
            openweather_api_key,
            timezone,
            weather_lat,
            weather_lon,
            reminder_check_period,
            reminder_send_timeout,
            brief_time,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}
