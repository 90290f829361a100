//! pkgsource configuration (`config.toml`)
//!
//! ```toml
//! powershell = "/usr/local/bin/pwsh"
//! force_bootstrap = true
//!
//! [[well_known]]
//! name = "InternalGallery"
//! strategy = "gallery-update"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::resource::{ConvergenceStrategy, WellKnownSources};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownEntry {
    pub name: String,
    #[serde(default = "default_strategy")]
    pub strategy: ConvergenceStrategy,
}

fn default_strategy() -> ConvergenceStrategy {
    ConvergenceStrategy::GalleryUpdate
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Explicit PowerShell executable, otherwise searched on PATH
    #[serde(default)]
    pub powershell: Option<String>,

    /// Let the registry install missing providers during queries
    #[serde(default = "default_true")]
    pub force_bootstrap: bool,

    /// Extra well-known sources, added to the built-in PSGallery entry
    #[serde(default)]
    pub well_known: Vec<WellKnownEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            powershell: None,
            force_bootstrap: true,
            well_known: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from `path`, or from the default location.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = paths::config_file()?;
                if !path.exists() {
                    log::debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config format in {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Well-known table: PSGallery plus configured entries
    pub fn well_known_sources(&self) -> WellKnownSources {
        let mut table = WellKnownSources::default();
        for entry in &self.well_known {
            table.insert(&entry.name, entry.strategy);
        }
        table
    }

    /// Expanded PowerShell executable path, if configured
    pub fn powershell_path(&self) -> Option<PathBuf> {
        self.powershell.as_deref().map(paths::expand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_env::{lock, with_var};
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.force_bootstrap);
        assert!(config.powershell_path().is_none());
        assert!(config.well_known_sources().strategy_for("PSGallery").is_some());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
powershell = "/opt/pwsh/pwsh"
force_bootstrap = false

[[well_known]]
name = "InternalGallery"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(!config.force_bootstrap);
        assert_eq!(config.powershell_path(), Some(PathBuf::from("/opt/pwsh/pwsh")));

        let table = config.well_known_sources();
        assert_eq!(
            table.strategy_for("internalgallery"),
            Some(ConvergenceStrategy::GalleryUpdate)
        );
        assert!(table.strategy_for("PSGallery").is_some());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_missing_default_file_gives_defaults() {
        let _guard = lock();
        let dir = TempDir::new().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        let config = with_var(paths::ENV_CONFIG_DIR, Some(dir_str), || Config::load(None));
        assert_eq!(config.unwrap(), Config::default());
    }

    #[test]
    fn test_default_file_is_read() {
        let _guard = lock();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(paths::CONFIG_FILE), "force_bootstrap = false\n").unwrap();
        let dir_str = dir.path().to_str().unwrap();
        let config = with_var(paths::ENV_CONFIG_DIR, Some(dir_str), || Config::load(None));
        assert!(!config.unwrap().force_bootstrap);
    }

    #[test]
    fn test_backend_key_is_rejected() {
        // Only the PowerShell registry persists registrations
        let result: Result<Config, _> = toml::from_str("backend = \"memory\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backnd = \"memory\"\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Invalid config format"));
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result: Result<Config, _> =
            toml::from_str("[[well_known]]\nname = \"X\"\nstrategy = \"rebuild\"\n");
        assert!(result.is_err());
    }
}
