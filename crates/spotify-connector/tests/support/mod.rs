//! Mock upstream shared by the integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use spotify_connector::{AuthEndpoints, Connector, ConnectorOptions, Credentials, RetryPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const PODCAST_ID: &str = "show123";
pub const AUTHORIZE_PATH: &str = "/oauth2/v2/auth";
pub const TOKEN_PATH: &str = "/api/token";

/// Base delay small enough to keep the suite fast, same doubling shape.
pub const TEST_BASE_DELAY: Duration = Duration::from_millis(10);

pub fn data_path(suffix: &str) -> String {
    format!("/v0/{suffix}")
}

/// Authorize page that echoes the request's `state`, as the real one does.
fn authorize_page(request: &Request) -> ResponseTemplate {
    let state = request
        .url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    ResponseTemplate::new(200).set_body_string(format!(
        "<!DOCTYPE html><html><head><script>\n\
         const authorizationResponse = {{type: \"authorization_response\", \
         response: {{code: \"AQB-code\", state: \"{state}\"}}}};\n\
         window.parent.postMessage(authorizationResponse, \"https://creators.spotify.com\");\n\
         </script></head></html>"
    ))
}

/// Mount authorize + token endpoints. Tokens are issued as `tok-1`, `tok-2`, …
pub async fn mount_auth(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(AUTHORIZE_PATH))
        .respond_with(authorize_page)
        .mount(server)
        .await;

    let issued = Arc::new(AtomicUsize::new(0));
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(move |_: &Request| {
            let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": format!("tok-{n}"),
                "token_type": "Bearer",
                "expires_in": 3600,
            }))
        })
        .mount(server)
        .await;
}

pub fn options(server: &MockServer) -> ConnectorOptions {
    let mut options = ConnectorOptions::new(PODCAST_ID, Credentials::new("dc-cookie", "key-cookie"));
    options.base_url = format!("{}/v0", server.uri());
    options.auth_endpoints = AuthEndpoints {
        authorize_url: format!("{}{AUTHORIZE_PATH}", server.uri()),
        token_url: format!("{}{TOKEN_PATH}", server.uri()),
    };
    options.retry = RetryPolicy::new(6, TEST_BASE_DELAY);
    options.timeout = Duration::from_secs(5);
    options
}

pub fn connector(server: &MockServer) -> Connector {
    Connector::new(options(server)).expect("connector builds")
}

/// Number of requests the server saw on `route`.
pub async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}
