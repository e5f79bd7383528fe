//! Process configuration for the `buildspec` CLI (TOML).
//!
//! This is not where concretized specs live — spec.md's non-goal on
//! persisted spec storage still applies — it is the small bit of ambient
//! configuration a concretizer run needs before it can do anything: which
//! architecture to assume and which compilers are known, absent a real
//! `PackageRepo`/`CompilerRegistry` backing store.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();
static CONFIG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();
static OVERRIDE_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub path: Option<PathBuf>,
    pub reason: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {}", path.display(), self.reason)
        } else {
            write!(f, "{}", self.reason)
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_architecture")]
    pub default_architecture: String,
    #[serde(default = "default_compilers")]
    pub known_compilers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_architecture: default_architecture(),
            known_compilers: default_compilers(),
        }
    }
}

fn default_architecture() -> String {
    "linux-x86_64".to_string()
}

fn default_compilers() -> Vec<String> {
    vec!["gcc".to_string(), "clang".to_string(), "intel".to_string()]
}

/// Load configuration once, optionally from `override_path`, falling back to
/// `$BUILDSPEC_CONFIG` or built-in defaults if nothing on disk is found.
pub fn init(override_path: Option<PathBuf>) -> Result<&'static Config, ConfigError> {
    let _ = OVERRIDE_PATH.set(override_path);
    load_config()
}

pub fn get() -> Result<&'static Config, ConfigError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    load_config()
}

pub fn config_path() -> Option<&'static Path> {
    CONFIG_PATH.get().and_then(|p| p.as_deref())
}

fn load_config() -> Result<&'static Config, ConfigError> {
    let override_path = OVERRIDE_PATH.get().and_then(|p| p.clone());
    let path = resolve_config_path(override_path.as_ref())?;
    let config = match &path {
        Some(p) => load_from_path(p)?,
        None => Config::default(),
    };

    let _ = CONFIG_PATH.set(path);
    let _ = CONFIG.set(config);
    Ok(CONFIG.get().unwrap())
}

fn resolve_config_path(override_path: Option<&PathBuf>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = override_path {
        return ensure_exists(path).map(Some);
    }

    if let Ok(raw) = std::env::var("BUILDSPEC_CONFIG") {
        let path = PathBuf::from(raw);
        return ensure_exists(&path).map(Some);
    }

    Ok(None)
}

fn ensure_exists(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(ConfigError {
            path: Some(path.to_path_buf()),
            reason: "config file not found".to_string(),
        })
    }
}

fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError {
        path: Some(path.to_path_buf()),
        reason: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError {
        path: Some(path.to_path_buf()),
        reason: e.to_string(),
    })
}
