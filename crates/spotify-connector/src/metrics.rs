//! Request counters
//!
//! Emitted through the `metrics` facade; no-ops until the embedding
//! application installs a recorder.
//!
//! - `spotify_requests_total` (counter): label `outcome`
//! - `spotify_request_retries_total` (counter): label `reason`
//! - `spotify_reauthentications_total` (counter)

/// Record the final outcome of one logical request.
pub fn record_request(outcome: &'static str) {
    metrics::counter!("spotify_requests_total", "outcome" => outcome).increment(1);
}

/// Record one retry and why it happened.
pub fn record_retry(reason: &'static str) {
    metrics::counter!("spotify_request_retries_total", "reason" => reason).increment(1);
}

/// Record a forced re-authentication after a 401.
pub fn record_reauthentication() {
    metrics::counter!("spotify_reauthentications_total").increment(1);
}
