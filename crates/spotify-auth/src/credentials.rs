//! Browser session cookies used to mint bearer tokens

use common::Secret;

use crate::constants::DEFAULT_CLIENT_ID;

/// The `sp_dc`/`sp_key` cookie pair plus the OAuth client ID.
///
/// Immutable once built. The session borrows it for every handshake.
#[derive(Debug, Clone)]
pub struct Credentials {
    sp_dc: Secret<String>,
    sp_key: Secret<String>,
    client_id: String,
}

impl Credentials {
    pub fn new(sp_dc: impl Into<String>, sp_key: impl Into<String>) -> Self {
        Self {
            sp_dc: Secret::new(sp_dc.into()),
            sp_key: Secret::new(sp_key.into()),
            client_id: DEFAULT_CLIENT_ID.to_string(),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Value for the `Cookie` header of the authorize request.
    pub(crate) fn cookie_header(&self) -> String {
        format!(
            "sp_dc={}; sp_key={}",
            self.sp_dc.expose(),
            self.sp_key.expose()
        )
    }
}
