//! Cookie-to-bearer authentication for the Spotify for Podcasters API
//!
//! The analytics API has no public OAuth client. A logged-in browser holds
//! `sp_dc`/`sp_key` cookies; this crate replays the dashboard's silent
//! authorization flow with them to mint short-lived bearer tokens.
//!
//! Handshake:
//! 1. `pkce::Challenge::generate()` mints state, verifier and S256 digest
//! 2. `authorize::request_code()` GETs the authorize page with the cookies
//!    and scrapes the embedded `authorizationResponse` literal
//! 3. `token::exchange_code()` trades the code plus verifier for a token
//! 4. `session::Session` caches the token, renews it near expiry, and
//!    poisons itself permanently on `login_required`

pub mod authorize;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod pkce;
pub mod session;
pub mod token;

pub use constants::*;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use pkce::{Challenge, compute_challenge};
pub use session::{AuthEndpoints, Session};
pub use token::{TokenResponse, exchange_code};
