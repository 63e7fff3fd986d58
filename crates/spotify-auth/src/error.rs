//! Error types for the cookie-to-bearer handshake

/// Errors from the authorization handshake.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The cookie session itself is invalid. Terminal for the session.
    #[error("credentials expired: {0}")]
    CredentialsExpired(String),

    /// The authorize page violated the handshake contract.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),
}

impl Error {
    /// Whether this failure is permanent for the session that produced it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Error::CredentialsExpired(_))
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_credentials_expired_is_terminal() {
        assert!(Error::CredentialsExpired("login required".into()).is_terminal());
        assert!(!Error::Authentication("state mismatch".into()).is_terminal());
        assert!(!Error::Http("timeout".into()).is_terminal());
        assert!(!Error::TokenExchange("400".into()).is_terminal());
    }
}
