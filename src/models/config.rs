//! Project configuration - .forge/config.yaml load/save

use crate::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Validation settings, all optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeSettings {
    /// When set, a phase may only advance with zero incomplete tasks,
    /// on top of the per-phase minimums.
    pub strict_validation: bool,
    /// When cleared, the Focus "test scenarios" mandatory check is skipped.
    pub require_test_scenarios: bool,
    /// Reserved; read but not acted on.
    pub auto_advance: bool,
}

impl Default for ForgeSettings {
    fn default() -> Self {
        Self {
            strict_validation: false,
            require_test_scenarios: true,
            auto_advance: false,
        }
    }
}

/// Per-phase toggle block in config.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseToggle {
    pub enabled: Option<bool>,
}

/// Contents of .forge/config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub project: String,
    pub description: String,
    pub created: Option<DateTime<Utc>>,
    pub version: String,
    pub settings: ForgeSettings,
    pub phases: BTreeMap<String, PhaseToggle>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            description: String::new(),
            created: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: ForgeSettings::default(),
            phases: BTreeMap::new(),
        }
    }
}

impl ForgeConfig {
    /// Build the config written by `forge init`.
    pub fn new(project_name: &str) -> Self {
        let mut phases = BTreeMap::new();
        for name in crate::models::PhaseName::ALL {
            phases.insert(
                name.as_str().to_lowercase(),
                PhaseToggle {
                    enabled: Some(true),
                },
            );
        }

        Self {
            project: project_name.to_string(),
            description: format!("FORGE-managed project: {}", project_name),
            created: Some(Utc::now()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: ForgeSettings::default(),
            phases,
        }
    }

    /// Load config from a project root. Missing file yields defaults so the
    /// validation settings always resolve.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".forge/config.yaml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config.yaml")?;
        serde_yaml::from_str(&content).context("Failed to parse config.yaml")
    }

    /// Save config to `<project_root>/.forge/config.yaml`.
    pub fn save(&self, project_root: &Path) -> Result<()> {
        let config_path = project_root.join(".forge/config.yaml");
        let content = serde_yaml::to_string(self).context("Failed to serialize config.yaml")?;
        std::fs::write(&config_path, content).context("Failed to write config.yaml")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join(".forge")).unwrap();

        let mut config = ForgeConfig::new("my-project");
        config.settings.strict_validation = true;
        config.save(temp_dir.path()).unwrap();

        let loaded = ForgeConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.project, "my-project");
        assert!(loaded.settings.strict_validation);
        assert!(loaded.settings.require_test_scenarios);
        assert_eq!(loaded.phases.len(), 5);
        assert_eq!(loaded.phases["focus"].enabled, Some(true));
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ForgeConfig::load(temp_dir.path()).unwrap();
        assert!(!config.settings.strict_validation);
        assert!(config.settings.require_test_scenarios);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let forge_dir = temp_dir.path().join(".forge");
        std::fs::create_dir_all(&forge_dir).unwrap();
        std::fs::write(
            forge_dir.join("config.yaml"),
            "project: partial\nsettings:\n  strict_validation: true\n",
        )
        .unwrap();

        let config = ForgeConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.project, "partial");
        assert!(config.settings.strict_validation);
        // Unspecified settings keep their defaults
        assert!(config.settings.require_test_scenarios);
    }
}
