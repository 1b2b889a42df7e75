//! Humanized elapsed-time formatting for `ps` output.

use chrono::{DateTime, Utc};

/// Format how long ago `t` was, e.g. "3 hours ago".
#[must_use]
pub fn time_ago(t: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(t);
    format!("{} ago", format_elapsed(elapsed.num_seconds().max(0)))
}

fn format_elapsed(secs: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    match secs {
        0 => "0 seconds".to_string(),
        s if s < MINUTE => format!("{s} seconds"),
        s if s < HOUR => format!("{} minutes", s / MINUTE),
        s if s < DAY => format!("{} hours", s / HOUR),
        s if s < WEEK => format!("{} days", s / DAY),
        s if s < MONTH => format!("{} weeks", s / WEEK),
        s if s < YEAR => format!("{} months", s / MONTH),
        s => format!("{} years", s / YEAR),
    }
}
