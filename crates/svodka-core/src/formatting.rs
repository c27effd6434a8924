use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Telegram caps messages at 4096 chars; stay under it with headroom for
/// formatting added downstream.
pub const SAFE_MESSAGE_LEN: usize = 3800;

/// Format an instant for display to the user, localized to `tz`.
pub fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Localized human date for the morning brief, e.g. "Friday, 20 June 2025".
pub fn format_brief_date(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%A, %-d %B %Y").to_string()
}

/// Split `text` into chunks of at most `max_len` bytes, cutting at the last
/// newline inside the window when there is one so lines stay intact.
///
/// `text` is expected to be ASCII-safe at cut points (we only feed it
/// newline-separated report text); a chunk without any newline is cut at a
/// char boundary at or below `max_len`.
pub fn split_in_chunks(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > max_len {
        let window = floor_char_boundary(rest, max_len);
        let mut cut = match rest[..window].rfind('\n') {
            Some(pos) if pos > 0 => pos,
            _ => window,
        };
        if cut == 0 {
            // max_len narrower than the first char: emit that char whole so
            // the loop always makes progress.
            cut = next_char_boundary(rest);
        }
        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start_matches('\n');
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn next_char_boundary(s: &str) -> usize {
    let mut idx = 1;
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx.min(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_local_localizes_to_zone() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 20, 12, 30, 0).unwrap();
        assert_eq!(
            format_local(instant, chrono_tz::Europe::Vilnius),
            "2025-06-20 15:30"
        );
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(split_in_chunks("hello", 10), vec!["hello".to_string()]);
        assert!(split_in_chunks("", 10).is_empty());
    }

    #[test]
    fn chunks_prefer_newline_boundaries() {
        let text = "line one\nline two\nline three";
        let chunks = split_in_chunks(text, 12);
        assert_eq!(chunks, vec!["line one", "line two", "line three"]);
    }

    #[test]
    fn text_without_newlines_is_cut_at_the_limit() {
        let text = "a".repeat(25);
        let chunks = split_in_chunks(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= 10));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn max_len_below_one_char_still_terminates() {
        let text = "ёёё"; // 2 bytes per char
        let chunks = split_in_chunks(text, 1);
        assert_eq!(chunks, vec!["ё", "ё", "ё"]);
        assert_eq!(split_in_chunks("ab", 1), vec!["a", "b"]);
    }

    #[test]
    fn multibyte_text_is_cut_at_char_boundaries() {
        let text = "ё".repeat(20); // 2 bytes each
        let chunks = split_in_chunks(&text, 7);
        assert!(chunks.iter().all(|c| c.len() <= 7));
        assert_eq!(chunks.concat(), text);
    }
}
