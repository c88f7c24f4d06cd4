//! User settings and well-known paths under `~/.chatflow/`.
//!
//! # Layout
//!
//! ```text
//! ~/.chatflow/
//!   config.yaml   (optional, see [`Settings`])
//!   data.yaml     (optional, replaces the bundled dataset)
//!   templates/    (optional, `.tera` overrides for reports)
//! ```
//!
//! Same pattern as everywhere else in the crate: `fn_at(home, …)` takes an
//! explicit home and is what tests call; `fn(…)` derives home from
//! `dirs::home_dir()` and delegates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::query::DEFAULT_PAGE_SIZE;

/// Environment variable naming a dataset file.
pub const DATA_ENV: &str = "CHATFLOW_DATA";

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

pub fn chatflow_root(home: &Path) -> PathBuf {
    home.join(".chatflow")
}

pub fn settings_path_at(home: &Path) -> PathBuf {
    chatflow_root(home).join("config.yaml")
}

pub fn default_data_path_at(home: &Path) -> PathBuf {
    chatflow_root(home).join("data.yaml")
}

pub fn templates_dir_at(home: &Path) -> PathBuf {
    chatflow_root(home).join("templates")
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Contents of `~/.chatflow/config.yaml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_path: Option<PathBuf>,
    pub page_size: usize,
    pub template_dir: Option<PathBuf>,
    /// Where `report` writes files when no `--output` is given.
    pub report_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            template_dir: None,
            report_dir: None,
        }
    }
}

impl Settings {
    /// Template override directory: configured, else `~/.chatflow/templates`.
    pub fn template_dir_at(&self, home: &Path) -> PathBuf {
        self.template_dir
            .clone()
            .unwrap_or_else(|| templates_dir_at(home))
    }
}

/// Load settings from `<home>/.chatflow/config.yaml`.
///
/// A missing file yields [`Settings::default`]; a malformed one is a
/// `RegistryError::Parse` carrying the path.
pub fn load_settings_at(home: &Path) -> Result<Settings, RegistryError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings =
        serde_yaml::from_str(&contents).map_err(|e| RegistryError::Parse { path, source: e })?;
    tracing::debug!(page_size = settings.page_size, "settings loaded");
    Ok(settings)
}

/// `load_settings_at` convenience wrapper.
pub fn load_settings() -> Result<Settings, RegistryError> {
    load_settings_at(&home()?)
}

// ---------------------------------------------------------------------------
// Dataset resolution
// ---------------------------------------------------------------------------

/// Where contacts, agents and messages come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Bundled,
}

/// Pick the dataset: explicit flag, then `env` (the value of [`DATA_ENV`]),
/// then `settings.data_path`, then `<home>/.chatflow/data.yaml` if it exists,
/// then the bundled data.
pub fn resolve_data_source_at(
    home: &Path,
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    settings: &Settings,
) -> DataSource {
    if let Some(path) = explicit
        .or(env)
        .or_else(|| settings.data_path.clone())
    {
        return DataSource::File(path);
    }
    let default = default_data_path_at(home);
    if default.exists() {
        return DataSource::File(default);
    }
    DataSource::Bundled
}

/// `resolve_data_source_at` convenience wrapper reading [`DATA_ENV`].
pub fn resolve_data_source(
    explicit: Option<PathBuf>,
    settings: &Settings,
) -> Result<DataSource, RegistryError> {
    let env = std::env::var_os(DATA_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    Ok(resolve_data_source_at(&home()?, explicit, env, settings))
}

fn home() -> Result<PathBuf, RegistryError> {
    dirs::home_dir().ok_or(RegistryError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
