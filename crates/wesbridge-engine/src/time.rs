use chrono::DateTime;

/// Render an epoch-millisecond backend timestamp as an RFC 3339 string.
///
/// Zero is treated as absent; the backend leaves the field unset rather
/// than reporting the epoch.
pub fn to_rfc3339(epoch_millis: Option<i64>) -> Option<String> {
  let millis = epoch_millis.filter(|&ms| ms != 0)?;
  DateTime::from_timestamp_millis(millis).map(|dt| dt.to_rfc3339())
}

/// Current time as epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
  chrono::Utc::now().timestamp_millis()
}
