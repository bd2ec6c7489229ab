//! Client configuration: CLI flags with environment fallbacks.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;

use hazellab_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Resolved client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub api_url: String,
    /// Where the session (token + user) is persisted.
    pub session_file: PathBuf,
    pub timeout: Duration,
    pub log_format: LogFormat,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, session_file: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.into(),
            session_file: session_file.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_format: LogFormat::default(),
        }
    }
}

/// Global flags of the `hazellab` binary.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Backend base URL.
    #[arg(long, global = true, env = "HAZELLAB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Session file (defaults to the OS data directory).
    #[arg(long, global = true, env = "HAZELLAB_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "HAZELLAB_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Log output: compact or json.
    #[arg(long, global = true, env = "HAZELLAB_LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,
}

impl ConfigArgs {
    pub fn resolve(self) -> anyhow::Result<ClientConfig> {
        let session_file = match self.session_file {
            Some(path) => path,
            None => default_session_file()?,
        };
        Ok(ClientConfig {
            api_url: self.api_url,
            session_file,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            log_format: self.log_format,
        })
    }
}

/// `<data dir>/hazellab/session.json`.
pub fn default_session_file() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS data directory - tried data_dir() and home_dir()/.local/share")?;
    dir.push("hazellab");
    dir.push("session.json");
    Ok(dir)
}
