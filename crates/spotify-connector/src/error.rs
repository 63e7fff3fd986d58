//! Error taxonomy surfaced to connector callers

/// Errors from connector operations. Callers match on the variant.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The cookie session is dead. Every later call on the same session
    /// fails the same way without touching the network.
    #[error("credentials expired: {0}")]
    CredentialsExpired(String),

    /// The authorize page broke the handshake contract (wrong discriminant,
    /// state mismatch, unparseable literal).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or token-endpoint failure while minting a token.
    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("all retries failed for URL {url} (last status: {}, attempts: {attempts})", display_status(.last_status))]
    MaxRetriesExceeded {
        url: String,
        last_status: Option<u16>,
        attempts: u32,
    },

    /// Non-retryable upstream status, passed through for diagnostics.
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        url: String,
        status: u16,
        body: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

impl From<spotify_auth::Error> for Error {
    fn from(err: spotify_auth::Error) -> Self {
        match err {
            spotify_auth::Error::CredentialsExpired(msg) => Error::CredentialsExpired(msg),
            spotify_auth::Error::Authentication(msg) => Error::Authentication(msg),
            spotify_auth::Error::Http(msg) | spotify_auth::Error::TokenExchange(msg) => {
                Error::Handshake(msg)
            }
        }
    }
}

/// Result alias for connector operations.
pub type Result<T> = std::result::Result<T, Error>;
