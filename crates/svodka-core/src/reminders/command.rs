use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{domain::ChatId, reminders::store::Reminder};

/// Why a `/remind` payload was rejected. These never reach the store; the
/// handler turns each into a reply to the user.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RemindParseError {
    #[error("expected: date, time and text")]
    Usage,
    #[error("could not parse date/time")]
    BadDateTime,
    #[error("that time does not exist in the configured time zone")]
    NonexistentLocalTime,
    #[error("that time is already in the past")]
    InThePast,
}

/// Parse a `/remind YYYY-MM-DD HH:MM text...` payload into a reminder.
///
/// The payload is everything after the command. The date/time pair is
/// interpreted in `tz` and stored as a UTC instant; `now` anchors the
/// not-in-the-past check. All validation happens here, before the store is
/// touched.
pub fn parse_remind(
    chat_id: ChatId,
    payload: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Reminder, RemindParseError> {
    let mut fields = payload.split_whitespace();
    let date = fields.next().ok_or(RemindParseError::Usage)?;
    let time = fields.next().ok_or(RemindParseError::Usage)?;
    let text = fields.collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return Err(RemindParseError::Usage);
    }

    let naive = NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
        .map_err(|_| RemindParseError::BadDateTime)?;

    let due_at = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // DST fold: take the earlier occurrence.
        LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => return Err(RemindParseError::NonexistentLocalTime),
    };

    if due_at <= now {
        return Err(RemindParseError::InThePast);
    }

    Ok(Reminder {
        chat_id,
        text,
        due_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TZ: Tz = chrono_tz::Europe::Vilnius;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn parses_payload_and_keeps_spaces_in_text() {
        let rem = parse_remind(ChatId(1), "2025-06-20 15:30 Buy flowers for mom", TZ, now())
            .unwrap();
        assert_eq!(rem.chat_id, ChatId(1));
        assert_eq!(rem.text, "Buy flowers for mom");
        // 15:30 Vilnius summer time is 12:30 UTC.
        assert_eq!(
            rem.due_at,
            Utc.with_ymd_and_hms(2025, 6, 20, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_missing_fields() {
        assert_eq!(
            parse_remind(ChatId(1), "", TZ, now()),
            Err(RemindParseError::Usage)
        );
        assert_eq!(
            parse_remind(ChatId(1), "2025-06-20 15:30", TZ, now()),
            Err(RemindParseError::Usage)
        );
    }

    #[test]
    fn rejects_malformed_datetime() {
        assert_eq!(
            parse_remind(ChatId(1), "20-06-2025 15:30 text", TZ, now()),
            Err(RemindParseError::BadDateTime)
        );
        assert_eq!(
            parse_remind(ChatId(1), "2025-06-20 25:99 text", TZ, now()),
            Err(RemindParseError::BadDateTime)
        );
    }

    #[test]
    fn rejects_past_timestamps() {
        assert_eq!(
            parse_remind(ChatId(1), "2025-01-01 08:00 too late", TZ, now()),
            Err(RemindParseError::InThePast)
        );
    }

    #[test]
    fn rejects_times_inside_a_dst_gap() {
        // 2025-03-30 03:30 does not exist in Europe/Vilnius (clocks jump
        // 03:00 -> 04:00).
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            parse_remind(ChatId(1), "2025-03-30 03:30 dst", TZ, early),
            Err(RemindParseError::NonexistentLocalTime)
        );
    }
}
