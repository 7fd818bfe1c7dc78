use chrono::{DateTime, Duration, Utc};

/// Decide whether the stored snapshot is fresh enough to serve.
///
/// True iff a snapshot exists and its age is strictly below `window`. Callers
/// that fail to read the store pass `None` so the request falls through to a
/// refresh instead of erroring.
pub fn use_cached(latest: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> bool {
    match latest {
        Some(timestamp) => now.signed_duration_since(timestamp) < window,
        None => false,
    }
}
