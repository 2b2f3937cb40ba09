//! Runtime configuration.
//!
//! Read once at startup from the environment (after loading `.env`), layered
//! over an optional YAML file named by `TASKDECK_CONFIG`. Environment values
//! win over the file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::Level;

use crate::error::{Error, Result};

/// Base URL used when replaying without an explicit API URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// State directory used when none is configured.
pub const DEFAULT_STATE_DIR: &str = ".taskdeck";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which backend the process talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// In-memory demo backend.
    Demo,
    /// Remote API at `base_url`.
    Remote {
        /// Base URL without a trailing `/`.
        base_url: String,
    },
}

/// Everything the application needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend selection.
    pub mode: Mode,
    /// Directory holding the session and demo state files.
    pub state_dir: PathBuf,
    /// Per-request timeout for the live transport.
    pub timeout: Duration,
    /// Maximum log level.
    pub log_level: Level,
    /// Cassette to record HTTP exchanges into.
    pub record: Option<PathBuf>,
    /// Cassette to serve HTTP exchanges from.
    pub replay: Option<PathBuf>,
}

/// Shape of the optional YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    demo_mode: Option<bool>,
    state_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
    log: Option<String>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            Error::Config(format!("failed to parse config file {}: {e}", path.display()))
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("{key} must be true or false, got '{other}'"))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    /// Reads `.env`, the optional YAML file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unreadable files or invalid values.
    pub fn from_env() -> Result<Self> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unreadable files or invalid values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| non_empty(lookup(key));
        let file = match var("TASKDECK_CONFIG") {
            Some(path) => FileConfig::load(Path::new(&path))?,
            None => FileConfig::default(),
        };

        let demo_forced = match var("TASKDECK_DEMO_MODE") {
            Some(raw) => parse_bool("TASKDECK_DEMO_MODE", &raw)?,
            None => file.demo_mode.unwrap_or(false),
        };
        let api_url = var("TASKDECK_API_URL").or_else(|| non_empty(file.api_url));
        let replay = var("TASKDECK_REPLAY").map(PathBuf::from);
        let record = var("TASKDECK_RECORD").map(PathBuf::from);

        let mode = match (demo_forced, api_url) {
            (false, Some(url)) => Mode::Remote { base_url: url.trim_end_matches('/').to_string() },
            (false, None) if replay.is_some() => {
                Mode::Remote { base_url: DEFAULT_BASE_URL.to_string() }
            }
            _ => Mode::Demo,
        };

        let timeout_secs = match var("TASKDECK_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("TASKDECK_TIMEOUT_SECS must be a whole number, got '{raw}'"))
            })?,
            None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(Error::Config("TASKDECK_TIMEOUT_SECS must be at least 1".into()));
        }

        let level = var("TASKDECK_LOG").or(file.log).unwrap_or_else(|| "warn".to_string());
        let log_level = Level::from_str(&level).map_err(|_| {
            Error::Config(format!("TASKDECK_LOG must be a log level, got '{level}'"))
        })?;

        Ok(Self {
            mode,
            state_dir: var("TASKDECK_STATE_DIR")
                .map(PathBuf::from)
                .or(file.state_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR)),
            timeout: Duration::from_secs(timeout_secs),
            log_level,
            record,
            replay,
        })
    }

    /// A demo configuration rooted at `state_dir`.
    pub fn demo(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::Demo,
            state_dir: state_dir.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: Level::WARN,
            record: None,
            replay: None,
        }
    }

    /// `true` in demo mode.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.mode == Mode::Demo
    }

    /// Where the session is persisted.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }

    /// Where the demo dataset is persisted between runs.
    #[must_use]
    pub fn demo_state_path(&self) -> PathBuf {
        self.state_dir.join("demo-state.json")
    }
}
