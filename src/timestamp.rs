use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;

/// Instant returned for timestamps that cannot be parsed.
pub fn zero() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Converts a Slack `ts` (fractional seconds since the epoch) into an instant,
/// truncated to whole seconds. Empty or unparsable input yields [`zero`].
pub fn parse(ts: &str) -> DateTime<Utc> {
    if ts.is_empty() {
        return zero();
    }

    let seconds = match ts.parse::<f64>() {
        Ok(seconds) => seconds,
        Err(e) => {
            warn!("Failed to parse Slack timestamp {ts:?}: {e}");
            return zero();
        }
    };

    DateTime::<Utc>::from_timestamp(seconds as i64, 0).unwrap_or_else(|| {
        warn!("Slack timestamp {ts:?} is out of range");
        zero()
    })
}

pub fn format_local(ts: &str, tz: Tz) -> String {
    tz.from_utc_datetime(&parse(ts).naive_utc())
        .format("%Y-%m-%d %I:%M %p")
        .to_string()
}
