//! Daily morning brief: weather plus exchange rates, sent to every
//! subscribed chat at a fixed local time.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::{
    formatting::format_brief_date,
    messaging::MessagingPort,
    ports::{CurrencyCode, CurrencyPort, WeatherPort},
    subscribers::SubscriberStore,
    tasks::TaskHandle,
};

pub struct MorningBrief {
    subscribers: Arc<SubscriberStore>,
    weather: Arc<dyn WeatherPort>,
    currency: Arc<dyn CurrencyPort>,
    messenger: Arc<dyn MessagingPort>,
    tz: Tz,
    at: NaiveTime,
    send_timeout: Duration,
}

impl MorningBrief {
    pub fn new(
        subscribers: Arc<SubscriberStore>,
        weather: Arc<dyn WeatherPort>,
        currency: Arc<dyn CurrencyPort>,
        messenger: Arc<dyn MessagingPort>,
        tz: Tz,
        at: NaiveTime,
        send_timeout: Duration,
    ) -> Self {
        Self {
            subscribers,
            weather,
            currency,
            messenger,
            tz,
            at,
            send_timeout,
        }
    }

    /// Spawn the daily loop: sleep until the next occurrence of the brief
    /// time in the configured zone, send, repeat. Cancellable like the
    /// reminder checker.
    pub fn spawn(self: Arc<Self>) -> TaskHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tracing::info!(tz = %self.tz, at = %self.at, "morning brief task started");
            loop {
                let next = next_occurrence(Utc::now(), self.tz, self.at);
                let wait = (next - Utc::now()).to_std().unwrap_or_default();
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = sleep(wait) => self.send_brief(next).await,
                }
            }
            tracing::info!("morning brief task stopped");
        });
        TaskHandle::new(cancel, handle)
    }

    /// Compose and send the brief to every subscriber. Provider failures
    /// degrade the text, they never skip the brief; a failed or hung send to
    /// one chat does not stop the rest. Each send runs under `send_timeout`
    /// so shutdown stays bounded mid-brief.
    pub async fn send_brief(&self, now: DateTime<Utc>) {
        let subscribers = self.subscribers.snapshot();
        if subscribers.is_empty() {
            return;
        }

        let body = self.compose(now).await;
        for chat_id in subscribers {
            let send = self.messenger.send_text(chat_id, &body);
            match timeout(self.send_timeout, send).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(chat_id = chat_id.0, %error, "failed to send morning brief");
                }
                Err(_) => {
                    tracing::warn!(chat_id = chat_id.0, "morning brief send timed out");
                }
            }
        }
    }

    async fn compose(&self, now: DateTime<Utc>) -> String {
        let weather_line = match self.weather.current().await {
            Ok(w) => format!("{}, {:.1}°C", w.description, w.temp_c),
            Err(error) => {
                tracing::warn!(%error, "morning brief: weather unavailable");
                "no data".to_string()
            }
        };

        let mut rate_lines = Vec::new();
        for code in [CurrencyCode::Eur, CurrencyCode::Usd] {
            match self.currency.official_rate(code).await {
                Ok(rate) => rate_lines.push(format!("💱 {code}: {rate:.4} BYN")),
                Err(error) => {
                    tracing::warn!(%code, %error, "morning brief: rate unavailable");
                    rate_lines.push(format!("💱 {code}: no data"));
                }
            }
        }

        format!(
            "🌞 Good morning! Today is {}\n\n🌡 Weather: {}\n{}",
            format_brief_date(now, self.tz),
            weather_line,
            rate_lines.join("\n"),
        )
    }
}

/// First instant at local time `at` in `tz` strictly after `after`.
///
/// A date whose local `at` falls into a DST gap is skipped.
pub fn next_occurrence(after: DateTime<Utc>, tz: Tz, at: NaiveTime) -> DateTime<Utc> {
    let local = after.with_timezone(&tz);
    let mut date = local.date_naive();
    if local.time() >= at {
        date = date + ChronoDuration::days(1);
    }

    // The gap never spans more than a day or two; bounded fallback keeps this
    // total without an unwrap.
    for _ in 0..4 {
        if let Some(dt) = tz.from_local_datetime(&date.and_time(at)).earliest() {
            return dt.with_timezone(&Utc);
        }
        date = date + ChronoDuration::days(1);
    }
    after + ChronoDuration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatId;
    use crate::ports::{CurrentWeather, DayForecast};
    use crate::{Error, Result};
    use std::sync::Mutex;

    const TZ: Tz = chrono_tz::Europe::Vilnius;

    fn eight() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn next_occurrence_same_day_before_the_hour() {
        // 03:00 UTC = 06:00 Vilnius summer time.
        let after = Utc.with_ymd_and_hms(2025, 6, 20, 3, 0, 0).unwrap();
        let next = next_occurrence(after, TZ, eight());
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 20, 5, 0, 0).unwrap());
    }

    #[test]
    fn next_occurrence_rolls_to_tomorrow_after_the_hour() {
        // 09:00 UTC = 12:00 Vilnius.
        let after = Utc.with_ymd_and_hms(2025, 6, 20, 9, 0, 0).unwrap();
        let next = next_occurrence(after, TZ, eight());
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 21, 5, 0, 0).unwrap());
    }

    struct FailingProviders;

    #[async_trait::async_trait]
    impl WeatherPort for FailingProviders {
        async fn current(&self) -> Result<CurrentWeather> {
            Err(Error::provider("openweathermap", "down"))
        }
        async fn today(&self) -> Result<DayForecast> {
            Err(Error::provider("openweathermap", "down"))
        }
    }

    #[async_trait::async_trait]
    impl CurrencyPort for FailingProviders {
        async fn official_rate(&self, _code: CurrencyCode) -> Result<f64> {
            Err(Error::provider("nbrb", "down"))
        }
    }

    /// Records sends; hangs forever for chat ids listed in `hang_for`.
    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(ChatId, String)>>,
        hang_for: Vec<i64>,
    }

    #[async_trait::async_trait]
    impl MessagingPort for RecordingMessenger {
        async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
            if self.hang_for.contains(&chat_id.0) {
                sleep(Duration::from_secs(24 * 3600)).await;
            }
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    fn brief(
        subscribers: Arc<SubscriberStore>,
        messenger: Arc<RecordingMessenger>,
    ) -> MorningBrief {
        let providers = Arc::new(FailingProviders);
        MorningBrief::new(
            subscribers,
            providers.clone(),
            providers,
            messenger,
            TZ,
            eight(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn brief_degrades_when_providers_fail() {
        let subscribers = Arc::new(SubscriberStore::new());
        subscribers.subscribe(ChatId(10));
        let messenger = Arc::new(RecordingMessenger::default());

        brief(subscribers, messenger.clone())
            .send_brief(Utc.with_ymd_and_hms(2025, 6, 20, 5, 0, 0).unwrap())
            .await;

        let sent = messenger.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("no data"));
        assert!(sent[0].1.contains("Friday, 20 June 2025"));
    }

    #[tokio::test]
    async fn brief_is_skipped_with_no_subscribers() {
        let messenger = Arc::new(RecordingMessenger::default());
        brief(Arc::new(SubscriberStore::new()), messenger.clone())
            .send_brief(Utc::now())
            .await;
        assert!(messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_send_is_timed_out_and_does_not_stop_the_rest() {
        let subscribers = Arc::new(SubscriberStore::new());
        subscribers.subscribe(ChatId(1));
        subscribers.subscribe(ChatId(2));
        let messenger = Arc::new(RecordingMessenger {
            hang_for: vec![1],
            ..RecordingMessenger::default()
        });

        brief(subscribers, messenger.clone())
            .send_brief(Utc.with_ymd_and_hms(2025, 6, 20, 5, 0, 0).unwrap())
            .await;

        let sent = messenger.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChatId(2));
    }
}
