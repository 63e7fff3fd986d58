//! Bearer token lifecycle for one set of cookies
//!
//! State machine: empty → authenticating → valid → (near expiry) →
//! authenticating → valid → … → poisoned. All reads and writes of the
//! token happen under one `tokio::sync::Mutex`, held across the whole
//! handshake, so concurrent callers that all find the token stale produce a
//! single handshake. A caller that waited on the lock re-checks the token
//! before doing anything; usually the previous holder already fixed it.
//!
//! Poisoning is terminal: after the authorize page reports `login_required`
//! every call fails with `CredentialsExpired` and no network I/O.

use std::time::{Duration, Instant};

use common::Secret;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::authorize;
use crate::constants::{AUTHORIZE_ENDPOINT, REFRESH_MARGIN_SECS, TOKEN_ENDPOINT};
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::pkce::Challenge;
use crate::token;

/// Where the two handshake requests go. Overridable for tests.
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub authorize_url: String,
    pub token_url: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: AUTHORIZE_ENDPOINT.to_string(),
            token_url: TOKEN_ENDPOINT.to_string(),
        }
    }
}

#[derive(Default)]
struct AuthState {
    token: Option<Secret<String>>,
    expires_at: Option<Instant>,
    poisoned: bool,
}

impl AuthState {
    /// The current token if it outlives `margin`.
    fn usable_token(&self, margin: Duration) -> Option<&Secret<String>> {
        let expires_at = self.expires_at?;
        if expires_at <= Instant::now() + margin {
            return None;
        }
        self.token.as_ref()
    }
}

/// Exchanges session cookies for bearer tokens and keeps one alive.
pub struct Session {
    client: reqwest::Client,
    credentials: Credentials,
    endpoints: AuthEndpoints,
    refresh_margin: Duration,
    state: Mutex<AuthState>,
}

impl Session {
    pub fn new(client: reqwest::Client, credentials: Credentials, endpoints: AuthEndpoints) -> Self {
        Self {
            client,
            credentials,
            endpoints,
            refresh_margin: Duration::from_secs(REFRESH_MARGIN_SECS),
            state: Mutex::new(AuthState::default()),
        }
    }

    /// Return a token valid for at least the refresh margin, running the
    /// handshake first if needed.
    pub async fn ensure_valid(&self) -> Result<Secret<String>> {
        let mut state = self.state.lock().await;
        if state.poisoned {
            return Err(poisoned_error());
        }
        if let Some(token) = state.usable_token(self.refresh_margin) {
            return Ok(token.clone());
        }

        debug!("bearer token missing or near expiry, authenticating");
        self.handshake(&mut state).await
    }

    /// Re-run the handshake after upstream rejected `rejected`, ignoring the
    /// expiry check. If the session already holds a different token, another
    /// caller refreshed while this one waited and that token is returned.
    pub async fn force_refresh(&self, rejected: &Secret<String>) -> Result<Secret<String>> {
        let mut state = self.state.lock().await;
        if state.poisoned {
            return Err(poisoned_error());
        }
        match state.token.as_ref() {
            Some(current) if current != rejected => {
                debug!("token already replaced by a concurrent refresh");
                return Ok(current.clone());
            }
            _ => {}
        }

        info!("bearer token rejected upstream, forcing re-authentication");
        self.handshake(&mut state).await
    }

    /// Whether a login-required condition has been observed.
    pub async fn is_poisoned(&self) -> bool {
        self.state.lock().await.poisoned
    }

    /// Both handshake steps. Caller holds the state lock.
    async fn handshake(&self, state: &mut AuthState) -> Result<Secret<String>> {
        let challenge = Challenge::generate();

        let code = match authorize::request_code(
            &self.client,
            &self.endpoints.authorize_url,
            &self.credentials,
            &challenge,
        )
        .await
        {
            Ok(code) => code,
            Err(e) if e.is_terminal() => {
                warn!(error = %e, "cookie session rejected, poisoning auth session");
                state.poisoned = true;
                state.token = None;
                state.expires_at = None;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let response = token::exchange_code(
            &self.client,
            &self.endpoints.token_url,
            self.credentials.client_id(),
            &code,
            &challenge.verifier,
        )
        .await?;

        let token = Secret::new(response.access_token);
        state.token = Some(token.clone());
        state.expires_at = Some(Instant::now() + Duration::from_secs(response.expires_in));
        info!(expires_in = response.expires_in, "bearer token acquired");
        Ok(token)
    }
}

fn poisoned_error() -> Error {
    Error::CredentialsExpired(
        "authentication has failed, not retrying; refresh the sp_dc/sp_key cookies".into(),
    )
}
