//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/saurieng/saurieng.toml`
//! 3. Local config: `--config <path>`, else `./saurieng.toml` if present
//! 4. Environment variables: `PORT`, then `SAURIENG_*` prefix
//!
//! CLI flags are applied on top by the command layer.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Local config file picked up from the working directory.
pub const LOCAL_CONFIG_FILE: &str = "saurieng.toml";

/// Which store adapter backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Embedded SQLite database (`data_dir/gardens.db`)
    #[default]
    Sqlite,
    /// Single JSON document (`data_dir/gardens.json`)
    Json,
    /// Process memory, lost on exit
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "json" => Ok(Self::Json),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown storage backend {other:?} (expected sqlite, json or memory)"
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sqlite => "sqlite",
            Self::Json => "json",
            Self::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// Raw settings for intermediate parsing (every field optional).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub uploads_dir: Option<PathBuf>,
    pub public_dir: Option<PathBuf>,
    pub backend: Option<StorageBackend>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seed_on_start: Option<bool>,
}

/// Unified configuration for saurieng.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the database or JSON document (default: ./data)
    pub data_dir: PathBuf,
    /// Directory for uploaded photos (default: ./uploads)
    pub uploads_dir: PathBuf,
    /// Optional static front-end served at `/`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<PathBuf>,
    /// Store adapter
    pub backend: StorageBackend,
    /// HTTP bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Create the sample garden on start when the store is empty
    pub seed_on_start: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            uploads_dir: PathBuf::from("./uploads"),
            public_dir: None,
            backend: StorageBackend::default(),
            host: "127.0.0.1".into(),
            port: 3000,
            seed_on_start: true,
        }
    }
}

/// Get the XDG config directory for saurieng.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "saurieng").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("saurieng.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// SQLite database file.
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("gardens.db")
    }

    /// JSON document file.
    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join("gardens.json")
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expand = |p: &Path| PathBuf::from(expand_env_vars(p.to_string_lossy().as_ref()));
        self.data_dir = expand(&self.data_dir);
        self.uploads_dir = expand(&self.uploads_dir);
        self.public_dir = self.public_dir.as_deref().map(expand);
    }

    /// Overlay wins wherever it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            uploads_dir: overlay
                .uploads_dir
                .clone()
                .unwrap_or_else(|| self.uploads_dir.clone()),
            public_dir: overlay.public_dir.clone().or_else(|| self.public_dir.clone()),
            backend: overlay.backend.unwrap_or(self.backend),
            host: overlay.host.clone().unwrap_or_else(|| self.host.clone()),
            port: overlay.port.unwrap_or(self.port),
            seed_on_start: overlay.seed_on_start.unwrap_or(self.seed_on_start),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit local config; must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config (explicit path, or ./saurieng.toml when present)
        match config_file {
            Some(path) => {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
            None => {
                let local = Path::new(LOCAL_CONFIG_FILE);
                if local.exists() {
                    let raw = load_raw_settings(local)?;
                    current = current.merge_with(&raw);
                }
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current, None)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply `PORT` and `SAURIENG_*` variables as explicit overrides.
    ///
    /// `vars` replaces the process environment when given (used by tests).
    pub fn apply_env_overrides(
        mut settings: Self,
        vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let plain_port = match &vars {
            Some(map) => map.get("PORT").cloned(),
            None => std::env::var("PORT").ok(),
        };
        if let Some(port) = plain_port {
            settings.port = parse_port(&port)?;
        }

        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SAURIENG")
                    .prefix_separator("_")
                    .separator("__")
                    .source(vars),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("uploads_dir") {
            settings.uploads_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("public_dir") {
            settings.public_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("backend") {
            settings.backend = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("host") {
            settings.host = val;
        }
        if let Ok(val) = config.get_string("port") {
            settings.port = parse_port(&val)?;
        }
        if let Ok(val) = config.get_bool("seed_on_start") {
            settings.seed_on_start = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# saurieng configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/saurieng/saurieng.toml
#   Local:  ./saurieng.toml (or --config <path>)
#   Env:    PORT, SAURIENG_* environment variables (e.g. SAURIENG_BACKEND=json)

# Where the database / JSON document lives
# data_dir = "./data"

# Where uploaded photos are written (served under /uploads)
# uploads_dir = "./uploads"

# Static front-end served at / (optional)
# public_dir = "./public"

# Store adapter: "sqlite", "json" or "memory"
# backend = "sqlite"

# HTTP listener
# host = "127.0.0.1"
# port = 3000

# Create the sample garden when the store is empty
# seed_on_start = true
"#
        .to_string()
    }
}

fn parse_port(raw: &str) -> Result<u16, ApplicationError> {
    raw.trim().parse().map_err(|_| ApplicationError::Config {
        message: format!("invalid port: {raw:?}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
