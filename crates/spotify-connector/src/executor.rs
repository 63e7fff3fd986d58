//! Resilient execution of one logical request
//!
//! Every call gets a bearer token from the shared [`Session`], sends the
//! request, and classifies the outcome:
//!
//! - 2xx: parse and return the JSON body
//! - 429/502/503/504 and transport failures: back off (`base * 2^(k-1)`)
//!   and retry
//! - 401: force a re-authentication and retry without growing the delay
//! - anything else: fail immediately with the status and body
//!
//! The attempt budget covers all of the above. After a transport failure
//! the next attempt reuses the token it already has instead of going back
//! through the session.

use std::sync::Arc;

use common::Secret;
use serde_json::Value;
use spotify_auth::Session;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::metrics;
use crate::retry::{QUIET_ATTEMPTS, RetryPolicy, StatusClass, classify_status};

/// URL plus query parameters for one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Per-call bookkeeping, dropped when `execute` returns.
#[derive(Default)]
struct RetryState {
    attempt: u32,
    backoff_steps: u32,
    last_status: Option<u16>,
    last_error: Option<reqwest::Error>,
}

impl RetryState {
    fn next_backoff_step(&mut self) -> u32 {
        self.backoff_steps += 1;
        self.backoff_steps
    }
}

/// Executes requests against the analytics API with auth and retries.
///
/// Cheap to clone; clones share the HTTP client and the auth session.
#[derive(Clone)]
pub struct RequestExecutor {
    client: reqwest::Client,
    session: Arc<Session>,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(client: reqwest::Client, session: Arc<Session>, policy: RetryPolicy) -> Self {
        Self {
            client,
            session,
            policy,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Run `request` to completion and return its JSON payload.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<Value> {
        let max_attempts = self.policy.max_attempts;
        let mut retry = RetryState::default();
        let mut token: Option<Secret<String>> = None;

        while retry.attempt < max_attempts {
            retry.attempt += 1;

            let bearer = match token.take() {
                Some(t) if retry.last_error.is_some() => t,
                _ => self.session.ensure_valid().await?,
            };

            let sent = self
                .client
                .get(&request.url)
                .query(&request.query)
                .bearer_auth(bearer.expose())
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    self.transport_retry(&mut retry, &request.url, e).await;
                    token = Some(bearer);
                    continue;
                }
            };

            retry.last_error = None;
            let status = response.status().as_u16();

            match classify_status(status) {
                StatusClass::Success => match response.text().await {
                    Ok(body) => {
                        metrics::record_request("success");
                        debug!(url = %request.url, status, attempt = retry.attempt, "request succeeded");
                        return parse_body(&body);
                    }
                    // body cut short or timed out: same treatment as a failed send
                    Err(e) => {
                        self.transport_retry(&mut retry, &request.url, e).await;
                        token = Some(bearer);
                    }
                },
                StatusClass::Transient => {
                    retry.last_status = Some(status);
                    let step = retry.next_backoff_step();
                    self.log_retry(&retry, &request.url, &format!("got {status}"), step);
                    metrics::record_retry("status");
                    self.backoff(&retry, step).await;
                }
                StatusClass::Unauthorized => {
                    retry.last_status = Some(status);
                    metrics::record_retry("unauthorized");
                    if retry.attempt < max_attempts {
                        metrics::record_reauthentication();
                        self.session.force_refresh(&bearer).await?;
                    }
                }
                StatusClass::Fatal => {
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| String::from("<no body>"));
                    error!(url = %request.url, status, body = %body, "error in API");
                    metrics::record_request("http_error");
                    return Err(Error::Http {
                        url: request.url.clone(),
                        status,
                        body,
                    });
                }
            }
        }

        metrics::record_request("exhausted");
        if let Some(e) = retry.last_error {
            return Err(Error::Transport(e));
        }
        Err(Error::MaxRetriesExceeded {
            url: request.url.clone(),
            last_status: retry.last_status,
            attempts: retry.attempt,
        })
    }

    /// Record a transport failure and back off before the next attempt.
    async fn transport_retry(&self, retry: &mut RetryState, url: &str, err: reqwest::Error) {
        let step = retry.next_backoff_step();
        self.log_retry(retry, url, &format!("network error: {err}"), step);
        metrics::record_retry("transport");
        retry.last_error = Some(err);
        self.backoff(retry, step).await;
    }

    /// Sleep before the next attempt; skipped once the budget is spent.
    async fn backoff(&self, retry: &RetryState, step: u32) {
        if retry.attempt < self.policy.max_attempts {
            tokio::time::sleep(self.policy.delay_for(step)).await;
        }
    }

    fn log_retry(&self, retry: &RetryState, url: &str, reason: &str, step: u32) {
        let delay_ms = self.policy.delay_for(step).as_millis() as u64;
        let attempt = retry.attempt;
        let max_attempts = self.policy.max_attempts;
        if attempt <= QUIET_ATTEMPTS {
            info!(url, attempt, max_attempts, delay_ms, "{reason}, retrying");
        } else {
            warn!(url, attempt, max_attempts, delay_ms, "{reason}, retrying");
        }
    }
}

fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| Error::Decode(format!("invalid JSON: {e}")))
}
