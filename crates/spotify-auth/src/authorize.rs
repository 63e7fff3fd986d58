//! Silent authorization step of the handshake
//!
//! The authorize endpoint answers `prompt=none` + `response_mode=web_message`
//! with an HTML page whose inline script assigns a JS object literal to
//! `authorizationResponse`. The literal is not JSON (keys are unquoted), so it
//! is read with the YAML flow-mapping parser, which accepts both forms.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::constants::{
    AUTHORIZATION_RESPONSE_TYPE, LOGIN_REQUIRED_MARKER, REDIRECT_URI, SCOPES,
};
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::pkce::Challenge;

static EMBEDDED_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)const authorizationResponse = (.*?);").expect("Invalid regex")
});

#[derive(Debug, Deserialize)]
struct EmbeddedResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    response: Option<EmbeddedParams>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Query parameters of the silent authorize request.
pub fn authorization_query<'a>(
    client_id: &'a str,
    challenge: &'a Challenge,
) -> [(&'static str, &'a str); 9] {
    [
        ("response_type", "code"),
        ("client_id", client_id),
        ("scope", SCOPES),
        ("redirect_uri", REDIRECT_URI),
        ("code_challenge", &challenge.digest),
        ("code_challenge_method", "S256"),
        ("state", &challenge.state),
        ("response_mode", "web_message"),
        ("prompt", "none"),
    ]
}

/// Run the authorize request with the session cookies and return the
/// one-time authorization code.
pub async fn request_code(
    client: &reqwest::Client,
    authorize_url: &str,
    credentials: &Credentials,
    challenge: &Challenge,
) -> Result<String> {
    let response = client
        .get(authorize_url)
        .query(&authorization_query(credentials.client_id(), challenge))
        .header(reqwest::header::COOKIE, credentials.cookie_header())
        .send()
        .await
        .map_err(|e| Error::Http(format!("authorize request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http(format!("authorize endpoint returned {status}")));
    }

    let page = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading authorize page: {e}")))?;

    parse_authorization_page(&page, &challenge.state)
}

/// Extract and validate the embedded authorization response.
///
/// `CredentialsExpired` when the page reports that login is required;
/// `Authentication` for any other deviation from the expected shape.
pub fn parse_authorization_page(page: &str, expected_state: &str) -> Result<String> {
    if page.contains(LOGIN_REQUIRED_MARKER) {
        return Err(Error::CredentialsExpired(
            "login required (sp_dc cookie expired?)".into(),
        ));
    }

    let literal = EMBEDDED_RESPONSE_RE
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            Error::Authentication("could not extract authorization response".into())
        })?;

    let embedded: EmbeddedResponse = serde_yaml::from_str(literal)
        .map_err(|e| Error::Authentication(format!("unparseable authorization response: {e}")))?;

    if embedded.kind != AUTHORIZATION_RESPONSE_TYPE {
        return Err(Error::Authentication(format!(
            "expected {AUTHORIZATION_RESPONSE_TYPE}, got {}",
            embedded.kind
        )));
    }

    let params = embedded.response.ok_or_else(|| {
        Error::Authentication("authorization response has no response object".into())
    })?;

    if params.state.as_deref() != Some(expected_state) {
        return Err(Error::Authentication("state parameter mismatch".into()));
    }

    match params.code {
        Some(code) if !code.is_empty() => {
            debug!("authorization code extracted");
            Ok(code)
        }
        _ => Err(Error::Authentication(format!(
            "authorization response carried no code (error: {})",
            params.error.as_deref().unwrap_or("none")
        ))),
    }
}
