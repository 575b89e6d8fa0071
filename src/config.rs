//! Configuration loading for rulefix
//!
//! Loads configuration from pyproject.toml [tool.rulefix] section

use crate::format::FormatterKind;
use crate::rules::get_all_rule_ids;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the table under `[tool]`
pub const TOOL_SECTION: &str = "rulefix";

/// Scratch file written with the latest analyzed input unless configured
pub const DEFAULT_SCRATCH_FILE: &str = "temp_code.py";

const DEFAULT_EXCLUDES: &[&str] = &[
    ".venv",
    "venv",
    "__pycache__",
    ".git",
    ".tox",
    "build",
    "dist",
    ".pytest_cache",
    ".ruff_cache",
    "node_modules",
    ".mypy_cache",
];

/// Errors raised while reading a config file that exists
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Rules to enable (empty means all rules, or use ["ALL"])
    #[serde(default)]
    pub enable: Vec<String>,

    /// Rules to disable
    #[serde(default)]
    pub disable: Vec<String>,

    /// Paths to exclude from analysis
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Scratch file for the latest input; empty string disables it
    #[serde(default)]
    pub scratch_file: Option<String>,

    #[serde(default)]
    pub formatter: FormatterKind,

    /// Program and arguments used when `formatter = "command"`
    #[serde(default)]
    pub formatter_command: Vec<String>,
}

impl Config {
    /// Resolved scratch file path, `None` when disabled
    pub fn scratch_path(&self) -> Option<PathBuf> {
        match self.scratch_file.as_deref() {
            None => Some(PathBuf::from(DEFAULT_SCRATCH_FILE)),
            Some("") => None,
            Some(path) => Some(PathBuf::from(path)),
        }
    }
}

/// Find pyproject.toml with a [tool.rulefix] section, walking up from a path
pub fn find_pyproject_toml(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path.parent()?
    } else {
        start_path
    };

    loop {
        let pyproject = current.join("pyproject.toml");
        if pyproject.exists() && has_tool_section(&pyproject) {
            return Some(pyproject);
        }

        current = current.parent()?;
    }
}

fn has_tool_section(pyproject: &Path) -> bool {
    std::fs::read_to_string(pyproject)
        .ok()
        .and_then(|content| toml::from_str::<toml::Value>(&content).ok())
        .is_some_and(|value| {
            value
                .get("tool")
                .and_then(|tool| tool.get(TOOL_SECTION))
                .is_some()
        })
}

/// Load configuration from pyproject.toml.
///
/// With no explicit path the file is discovered from the current directory.
/// A missing file or section is `Ok(None)`; a present but malformed one is
/// an error.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>, ConfigError> {
    let config_path = match path {
        Some(p) if p.exists() => p.to_path_buf(),
        Some(_) => return Ok(None),
        None => {
            let Some(found) = std::env::current_dir()
                .ok()
                .and_then(|cwd| find_pyproject_toml(&cwd))
            else {
                return Ok(None);
            };
            found
        }
    };

    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: config_path.clone(),
        source,
    })?;

    let Some(section) = value.get("tool").and_then(|tool| tool.get(TOOL_SECTION)) else {
        return Ok(None);
    };

    let config: Config = section
        .clone()
        .try_into()
        .map_err(|source| ConfigError::Toml {
            path: config_path.clone(),
            source,
        })?;

    log::debug!("loaded configuration from {}", config_path.display());
    Ok(Some(config))
}

/// All rule ids except `disabled`
fn all_rules_except(disabled: &[String]) -> Vec<String> {
    get_all_rule_ids()
        .into_iter()
        .filter(|r| !disabled.contains(r))
        .collect()
}

/// Resolve an enable/disable pair; `None` when neither is set
fn resolve_enabled(enable: &[String], disable: &[String]) -> Option<Vec<String>> {
    if enable.iter().any(|r| r == "ALL") {
        Some(all_rules_except(disable))
    } else if !enable.is_empty() {
        Some(enable.to_vec())
    } else if !disable.is_empty() {
        Some(all_rules_except(disable))
    } else {
        None
    }
}

/// Merge command line arguments with config file settings
/// CLI arguments take precedence
pub fn merge_config(
    config: Option<&Config>,
    cli_enable: &[String],
    cli_disable: &[String],
    cli_exclude: &[String],
) -> (Option<Vec<String>>, Vec<String>) {
    let mut exclude = vec![];

    let from_cli = resolve_enabled(cli_enable, cli_disable);
    let enable = match (from_cli, config) {
        (Some(enabled), _) => Some(enabled),
        (None, Some(cfg)) => resolve_enabled(&cfg.enable, &cfg.disable),
        (None, None) => None,
    };

    if let Some(cfg) = config {
        exclude.extend(cfg.exclude.iter().cloned());
    }
    exclude.extend(cli_exclude.iter().cloned());

    for default in DEFAULT_EXCLUDES {
        if !exclude.iter().any(|e| e == default) {
            exclude.push(default.to_string());
        }
    }

    (enable, exclude)
}
