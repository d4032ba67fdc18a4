use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::registry::{CodeRange, WeatherCodeRegistry};

fn default_true() -> bool {
    true
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Start from the built-in OpenWeatherMap table.
    #[serde(default = "default_true")]
    pub use_builtin_statuses: bool,

    /// Custom status labels; each replaces a built-in label of the same name.
    ///
    /// Example TOML:
    /// [statuses]
    /// drizzle = [{ start = 300, end = 321 }]
    #[serde(default)]
    pub statuses: BTreeMap<String, Vec<CodeRange>>,
}

impl Default for Config {
    fn default() -> Self {
        Self { use_builtin_statuses: true, statuses: BTreeMap::new() }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherset", "weatherset-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Add a code range to a custom status label. Labels are stored lower-cased.
    pub fn upsert_status_range(&mut self, label: &str, range: CodeRange) -> Result<()> {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return Err(anyhow!("Status label must not be empty"));
        }

        let ranges = self.statuses.entry(label).or_default();
        if !ranges.contains(&range) {
            ranges.push(range);
        }
        Ok(())
    }

    /// Registry built from the built-in table (if enabled) overlaid with custom labels.
    pub fn registry(&self) -> WeatherCodeRegistry {
        let custom = WeatherCodeRegistry::new(self.statuses.clone());
        if self.use_builtin_statuses {
            WeatherCodeRegistry::openweather().merge(custom)
        } else {
            custom
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StatusCodeRegistry;

    #[test]
    fn default_config_uses_builtin_table() {
        let cfg = Config::default();
        let registry = cfg.registry();

        assert_eq!(registry.label_for(800), Ok("sun"));
        assert_eq!(registry.label_for(501), Ok("rain"));
    }

    #[test]
    fn upsert_lowercases_and_deduplicates() {
        let mut cfg = Config::default();

        cfg.upsert_status_range(" Drizzle ", CodeRange::new(300, 321)).unwrap();
        cfg.upsert_status_range("drizzle", CodeRange::new(300, 321)).unwrap();

        assert_eq!(cfg.statuses.get("drizzle"), Some(&vec![CodeRange::new(300, 321)]));
    }

    #[test]
    fn upsert_rejects_empty_label() {
        let mut cfg = Config::default();
        let err = cfg.upsert_status_range("   ", CodeRange::single(1)).unwrap_err();

        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn custom_label_overrides_builtin() {
        let mut cfg = Config::default();
        cfg.upsert_status_range("rain", CodeRange::single(7)).unwrap();

        let registry = cfg.registry();
        assert_eq!(registry.label_for(7), Ok("rain"));
        assert!(registry.label_for(500).is_err());
        assert_eq!(registry.label_for(600), Ok("snow"));
    }

    #[test]
    fn builtin_table_can_be_disabled() {
        let mut cfg = Config { use_builtin_statuses: false, ..Config::default() };
        cfg.upsert_status_range("clear", CodeRange::single(1)).unwrap();

        let registry = cfg.registry();
        assert_eq!(registry.label_for(1), Ok("clear"));
        assert!(registry.label_for(800).is_err());
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_status_range("drizzle", CodeRange::new(300, 321)).unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn parses_handwritten_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[statuses]\nsleet = [{ start = 611, end = 613 }]\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert!(cfg.use_builtin_statuses);
        assert_eq!(cfg.registry().label_for(612), Ok("sleet"));
    }

    #[test]
    fn parse_error_mentions_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "statuses = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
