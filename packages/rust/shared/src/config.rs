//! Application configuration for RosterScout.
//!
//! User config lives at `~/.rosterscout/rosterscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, RosterScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "rosterscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".rosterscout";

// ---------------------------------------------------------------------------
// Results databases
// ---------------------------------------------------------------------------

/// Results database whose athlete profiles are looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// IPF-affiliated results only.
    #[default]
    OpenIpf,
    /// All federations.
    OpenPowerlifting,
}

impl Database {
    /// Base path that profile identifiers are appended to.
    pub fn profile_base(&self) -> &'static str {
        match self {
            Self::OpenIpf => "https://www.openipf.org/u/",
            Self::OpenPowerlifting => "https://www.openpowerlifting.org/u/",
        }
    }

    /// Name-search page, used when no profile could be guessed.
    pub fn search_base(&self) -> &'static str {
        match self {
            Self::OpenIpf => "https://www.openipf.org/search",
            Self::OpenPowerlifting => "https://www.openpowerlifting.org/search",
        }
    }
}

impl std::fmt::Display for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenIpf => f.write_str("openipf"),
            Self::OpenPowerlifting => f.write_str("openpowerlifting"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config structs (matching rosterscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Profile lookup settings.
    #[serde(default)]
    pub lookup: LookupSection,

    /// Roster page retrieval settings.
    #[serde(default)]
    pub roster: RosterSection,
}

/// `[lookup]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSection {
    /// Results database to query.
    #[serde(default)]
    pub database: Database,

    /// Override for the profile base path (must end with `/`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout for profile fetches.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum number of roster entries with requests in flight at once.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: u32,
}

impl Default for LookupSection {
    fn default() -> Self {
        Self {
            database: Database::default(),
            base_url: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

fn default_fetch_timeout_secs() -> u64 {
    15
}
fn default_max_in_flight() -> u32 {
    8
}

/// `[roster]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSection {
    /// Timeout for fetching the roster page itself.
    #[serde(default = "default_roster_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RosterSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_roster_timeout_secs(),
        }
    }
}

fn default_roster_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Lookup config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime lookup configuration: merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Database the profiles belong to.
    pub database: Database,
    /// Base path that candidate identifiers are appended to.
    pub base_url: Url,
    /// Per-request timeout; an elapsed fetch counts as a failed candidate.
    pub fetch_timeout: Duration,
    /// Upper bound on roster entries resolving concurrently.
    pub max_in_flight: usize,
}

impl LookupConfig {
    /// Defaults for the given database.
    pub fn for_database(database: Database) -> Self {
        let section = LookupSection {
            database,
            ..LookupSection::default()
        };
        Self {
            database,
            // The built-in bases are static and well-formed.
            base_url: Url::parse(database.profile_base()).expect("static profile base URL"),
            fetch_timeout: Duration::from_secs(section.fetch_timeout_secs),
            max_in_flight: section.max_in_flight as usize,
        }
    }

    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == 0 {
            return Err(RosterScoutError::config("max_in_flight must be at least 1"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(RosterScoutError::config("fetch timeout must be non-zero"));
        }
        if self.base_url.cannot_be_a_base() {
            return Err(RosterScoutError::config(format!(
                "profile base URL cannot take path segments: {}",
                self.base_url
            )));
        }
        Ok(())
    }
}

impl TryFrom<&AppConfig> for LookupConfig {
    type Error = RosterScoutError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let section = &config.lookup;
        let raw_base = section
            .base_url
            .as_deref()
            .unwrap_or_else(|| section.database.profile_base());
        let base_url = Url::parse(raw_base).map_err(|e| {
            RosterScoutError::config(format!("invalid lookup.base_url '{raw_base}': {e}"))
        })?;

        let lookup = Self {
            database: section.database,
            base_url,
            fetch_timeout: Duration::from_secs(section.fetch_timeout_secs),
            max_in_flight: section.max_in_flight as usize,
        };
        lookup.validate()?;
        Ok(lookup)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.rosterscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RosterScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.rosterscout/rosterscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RosterScoutError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        RosterScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RosterScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RosterScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RosterScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
