//! Failures while assembling settings and cookies

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A setting is present but unusable (bad URL scheme, zero timeout,
    /// unreadable credentials file).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A cookie was found neither in the environment nor in the
    /// credentials file. Holds the variable name.
    #[error("missing credential {0}: export it or add it to credentials_file")]
    MissingCredential(String),

    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
