//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The sp_dc/sp_key cookies come from SPOTIFY_SP_DC / SPOTIFY_SP_KEY or from
//! a dotenv-style credentials_file, never from the TOML itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use common::Secret;
use serde::Deserialize;
use spotify_connector::{ConnectorOptions, Credentials, DEFAULT_BASE_URL, RetryPolicy};

const DEFAULT_CONFIG_FILE: &str = "podcast-analytics.toml";

const SP_DC_VAR: &str = "SPOTIFY_SP_DC";
const SP_KEY_VAR: &str = "SPOTIFY_SP_KEY";
const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
const PODCAST_ID_VAR: &str = "SPOTIFY_PODCAST_ID";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Account and API settings
#[derive(Debug, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub podcast_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// KEY=VALUE file holding SPOTIFY_SP_DC and SPOTIFY_SP_KEY
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    #[serde(skip)]
    pub sp_dc: Option<Secret<String>>,
    #[serde(skip)]
    pub sp_key: Option<Secret<String>>,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            podcast_id: None,
            client_id: None,
            base_url: default_base_url(),
            credentials_file: None,
            sp_dc: None,
            sp_key: None,
        }
    }
}

/// Transport and retry settings
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    6
}

fn default_base_delay() -> u64 {
    2
}

impl Config {
    /// Load the config selected by `cli_path` / CONFIG_PATH.
    ///
    /// Only the implicit default file may be absent; an explicitly named
    /// file that does not exist is an error.
    pub fn from_cli(cli_path: Option<&str>) -> common::Result<Self> {
        let explicit = cli_path.is_some() || std::env::var_os("CONFIG_PATH").is_some();
        let path = Self::resolve_path(cli_path);
        if !explicit && !path.exists() {
            return Self::from_toml("");
        }
        Self::load(&path)
    }

    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    fn from_toml(contents: &str) -> common::Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.validate()?;
        config.apply_env()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        let base_url = &self.spotify.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {base_url}"
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if self.http.max_attempts == 0 {
            return Err(common::Error::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.http.base_delay_secs == 0 {
            return Err(common::Error::Config(
                "base_delay_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Env vars win over the credentials file and the TOML values.
    fn apply_env(&mut self) -> common::Result<()> {
        let spotify = &mut self.spotify;

        if let Some(ref file) = spotify.credentials_file {
            let contents = std::fs::read_to_string(file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read credentials_file {}: {e}",
                    file.display()
                ))
            })?;
            for (key, value) in parse_env_file(&contents) {
                match key {
                    SP_DC_VAR => spotify.sp_dc = Some(Secret::new(value)),
                    SP_KEY_VAR => spotify.sp_key = Some(Secret::new(value)),
                    _ => {}
                }
            }
        }

        if let Some(dc) = non_empty_env(SP_DC_VAR) {
            spotify.sp_dc = Some(Secret::new(dc));
        }
        if let Some(key) = non_empty_env(SP_KEY_VAR) {
            spotify.sp_key = Some(Secret::new(key));
        }
        if let Some(client_id) = non_empty_env(CLIENT_ID_VAR) {
            spotify.client_id = Some(client_id);
        }
        if let Some(podcast_id) = non_empty_env(PODCAST_ID_VAR) {
            spotify.podcast_id = Some(podcast_id);
        }
        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    pub fn credentials(&self) -> common::Result<Credentials> {
        let sp_dc = self
            .spotify
            .sp_dc
            .as_ref()
            .ok_or_else(|| common::Error::MissingCredential(SP_DC_VAR.into()))?;
        let sp_key = self
            .spotify
            .sp_key
            .as_ref()
            .ok_or_else(|| common::Error::MissingCredential(SP_KEY_VAR.into()))?;

        let credentials = Credentials::new(sp_dc.expose().as_str(), sp_key.expose().as_str());
        Ok(match self.spotify.client_id {
            Some(ref client_id) => credentials.with_client_id(client_id.as_str()),
            None => credentials,
        })
    }

    /// Options for a connector bound to `podcast_id`.
    pub fn connector_options(&self, podcast_id: &str) -> common::Result<ConnectorOptions> {
        let mut options = ConnectorOptions::new(podcast_id, self.credentials()?);
        options.base_url = self.spotify.base_url.clone();
        options.timeout = Duration::from_secs(self.http.timeout_secs);
        options.retry = RetryPolicy::new(
            self.http.max_attempts,
            Duration::from_secs(self.http.base_delay_secs),
        );
        Ok(options)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// `KEY=VALUE` pairs, skipping blanks and `#` comments. Values may be quoted.
fn parse_env_file(contents: &str) -> impl Iterator<Item = (&str, String)> {
    contents.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        Some((key.trim(), value.to_owned()))
    })
}
