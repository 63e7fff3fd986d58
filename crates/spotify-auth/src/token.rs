//! Authorization code exchange
//!
//! Second step of the handshake: the one-time code from the authorize page
//! plus the PKCE verifier are POSTed form-encoded to the token endpoint.

use serde::Deserialize;

use crate::constants::REDIRECT_URI;
use crate::error::{Error, Result};

/// Token endpoint response. Only the fields the session keeps.
///
/// `expires_in` is a delta in seconds from the response time.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Exchange an authorization code for a bearer token.
pub async fn exchange_code(
    client: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
            ("code_verifier", verifier),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::TokenExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn token_response_ignores_extra_fields() {
        let json = r#"{"access_token":"BQD","token_type":"Bearer","expires_in":3600,"scope":"streaming"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "BQD");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn debug_redacts_access_token() {
        let token = TokenResponse {
            access_token: "BQD-secret".into(),
            expires_in: 60,
        };
        assert!(!format!("{token:?}").contains("BQD-secret"));
    }

    #[tokio::test]
    async fn posts_code_and_verifier_form_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .and(body_string_contains("code_verifier=the-verifier"))
            .and(body_string_contains("client_id=cid"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "abc", "expires_in": 3600})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = exchange_code(
            &reqwest::Client::new(),
            &format!("{}/api/token", server.uri()),
            "cid",
            "the-code",
            "the-verifier",
        )
        .await
        .unwrap();

        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 3600);
    }

    #[tokio::test]
    async fn non_success_status_is_token_exchange_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let err = exchange_code(&reqwest::Client::new(), &server.uri(), "cid", "c", "v")
            .await
            .unwrap_err();

        match err {
            Error::TokenExchange(msg) => assert!(msg.contains("invalid_grant"), "got: {msg}"),
            other => panic!("expected TokenExchange, got {other:?}"),
        }
    }
}
