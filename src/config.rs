//! Configuration Management
//!
//! Desired labels and milestones, and loading them from YAML or JSON files

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration file used when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "ghsync.yaml";

/// Sync Configuration
///
/// Desired state applied to every repository. Loaded once per run and passed
/// by reference to the reconcilers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Label name to color (6-digit hex, optional leading #)
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Milestones, applied in the listed order
    #[serde(default)]
    pub milestones: Vec<MilestoneConfig>,
}

/// Milestone Configuration
///
/// Values are kept as written in the configuration file; state and due date
/// are checked when the milestone is reconciled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MilestoneConfig {
    /// Milestone title, used to match existing milestones
    pub title: String,

    /// Milestone description
    #[serde(default)]
    pub description: String,

    /// "open" or "closed" (empty means "open")
    #[serde(default)]
    pub state: String,

    /// Due date in RFC 3339 format
    #[serde(default, rename = "due")]
    pub due_date: String,
}

impl MilestoneConfig {
    /// Create a new open milestone configuration
    pub fn new(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: due_date.into(),
            ..Self::default()
        }
    }
}

impl SyncConfig {
    /// Check the structural validity of the configuration
    ///
    /// # Errors
    /// - If a label name is empty
    /// - If a milestone title is empty
    pub fn validate(&self) -> Result<()> {
        if self.labels.keys().any(|name| name.trim().is_empty()) {
            return Err(Error::config_validation("Label name cannot be empty"));
        }

        if self.milestones.iter().any(|m| m.title.trim().is_empty()) {
            return Err(Error::config_validation("Milestone title cannot be empty"));
        }

        Ok(())
    }
}

/// Normalize a label color by removing a single leading #
pub fn normalize_color(color: &str) -> &str {
    color.strip_prefix('#').unwrap_or(color)
}

/// Validate hex color code
///
/// # Arguments
/// - `color`: Color code (6-digit hex without #)
///
/// # Returns
/// True if valid
pub fn is_valid_hex_color(color: &str) -> bool {
    if color.len() != 6 {
        return false;
    }

    color.chars().all(|c| c.is_ascii_hexdigit())
}

/// Load configuration from JSON file
///
/// # Errors
/// If file reading or parsing fails
pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: SyncConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from YAML file
///
/// # Errors
/// If file reading or parsing fails
pub fn load_config_from_yaml<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: SyncConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file, detecting format by extension
///
/// # Arguments
/// - `path`: Path to the configuration file (.json, .yaml, or .yml)
///
/// # Errors
/// If file reading, parsing, or validation fails, or if the extension is unsupported
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Configuration file not found: {}", path.display()),
        )
        .into());
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_config_from_json(path),
        Some("yaml") | Some("yml") => load_config_from_yaml(path),
        _ => Err(Error::config_validation(
            "Configuration file must be .json, .yaml, or .yml",
        )),
    }
}
