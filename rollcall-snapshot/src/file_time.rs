use chrono::{DateTime, Utc};

/// 100 ns ticks between 1601-01-01T00:00:00Z and the Unix epoch.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Convert a UTC file time (100 ns ticks since 1601-01-01) to a timestamp.
///
/// Negative file times are rejected.
pub fn file_time_to_utc(file_time: i64) -> Option<DateTime<Utc>> {
  if file_time < 0 {
    return None;
  }
  let since_unix = file_time - UNIX_EPOCH_TICKS;
  let secs = since_unix.div_euclid(TICKS_PER_SECOND);
  let nanos = since_unix.rem_euclid(TICKS_PER_SECOND) * 100;
  DateTime::from_timestamp(secs, u32::try_from(nanos).ok()?)
}
