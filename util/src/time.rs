//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a unix timestamp in seconds into a UTC datetime.
///
/// Returns `None` if the timestamp isn't finite or can't be represented.
pub fn unix_seconds_to_datetime(timestamp_s: f64) -> Option<chrono::DateTime<chrono::Utc>> {
    use chrono::TimeZone;

    if !timestamp_s.is_finite() {
        return None;
    }

    chrono::Utc
        .timestamp_millis_opt((timestamp_s * 1000.0).round() as i64)
        .single()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unix_seconds() {
        let dt = unix_seconds_to_datetime(1.5).unwrap();
        assert_eq!(dt.timestamp_millis(), 1500);
        assert!(unix_seconds_to_datetime(f64::NAN).is_none());
        assert!(unix_seconds_to_datetime(f64::INFINITY).is_none());
    }

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(250)),
            Some(0.25)
        );
    }
}
