//! Pieces shared by the auth crate, the connector and the CLI
//!
//! [`Secret`] carries the `sp_dc`/`sp_key` cookies and bearer tokens so they
//! never reach logs. [`Error`] covers everything that can go wrong before the
//! first request: reading the config file, parsing it, and finding cookies.

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
