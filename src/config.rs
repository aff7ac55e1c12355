//! Analyzer configuration.
//!
//! Values come from `.ripple.yaml` in the project root (all fields optional),
//! then from `RIPPLE_*` environment variables, which may themselves be set
//! through a `.env` file.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RippleError};
use crate::ports::filesystem::FileSystem;

/// File name of the per-project configuration.
pub const CONFIG_FILE: &str = ".ripple.yaml";

/// Minimum confidence for pairing a removed export with an added export of
/// the opposite type (named vs default).
pub const DEFAULT_PAIRING_THRESHOLD: u8 = 2;

/// Files larger than this are treated as unanalyzable.
pub const DEFAULT_MAX_FILE_BYTES: usize = 2 * 1024 * 1024;

/// Tunables for snapshotting, graph building and test detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Directory names never descended into during a project walk.
    pub skip_dirs: Vec<String>,
    /// Directory names whose contents are considered tests.
    pub test_dir_names: Vec<String>,
    /// File name fragments marking a test file (e.g. `.test.`).
    pub test_name_markers: Vec<String>,
    /// Confidence needed to pair a named/default export transition.
    pub pairing_threshold: u8,
    /// Largest source file that is parsed.
    pub max_file_bytes: usize,
    /// Wall-clock budget for the project walk, in milliseconds.
    pub walk_budget_ms: Option<u64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            skip_dirs: [
                "node_modules",
                "bower_components",
                "jspm_packages",
                "dist",
                "build",
                "out",
                "coverage",
                "target",
                ".git",
                ".hg",
                ".svn",
                ".next",
                ".nuxt",
                ".turbo",
                ".cache",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            test_dir_names: ["__tests__", "test", "tests", "spec", "e2e"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            test_name_markers: [".test.", ".spec."].iter().map(ToString::to_string).collect(),
            pairing_threshold: DEFAULT_PAIRING_THRESHOLD,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            walk_budget_ms: None,
        }
    }
}

impl AnalyzerConfig {
    /// Loads `.ripple.yaml` from `root` (if present) and applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if an override variable holds a malformed number.
    pub fn load(fs: &dyn FileSystem, root: &Path) -> Result<Self> {
        // A missing .env is the common case.
        let _ = dotenvy::dotenv();

        let path = root.join(CONFIG_FILE);
        let mut config = if fs.is_file(&path) {
            let yaml = fs.read_to_string(&path).map_err(|e| RippleError::read(&path, e))?;
            Self::from_yaml(&yaml)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        tracing::debug!(?config, "loaded analyzer config");
        Ok(config)
    }

    /// Parses a YAML document; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML for this shape.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| RippleError::Config(format!("{CONFIG_FILE}: {e}")))
    }

    /// Applies `RIPPLE_PAIRING_THRESHOLD`, `RIPPLE_WALK_BUDGET_MS` and
    /// `RIPPLE_MAX_FILE_BYTES` using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but not a valid number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("RIPPLE_PAIRING_THRESHOLD") {
            self.pairing_threshold = parse_var("RIPPLE_PAIRING_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("RIPPLE_WALK_BUDGET_MS") {
            self.walk_budget_ms = Some(parse_var("RIPPLE_WALK_BUDGET_MS", &value)?);
        }
        if let Some(value) = lookup("RIPPLE_MAX_FILE_BYTES") {
            self.max_file_bytes = parse_var("RIPPLE_MAX_FILE_BYTES", &value)?;
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RippleError::Config(format!("{name} must be a number, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    #[test]
    fn missing_file_yields_defaults() {
        let fs = MemoryFileSystem::with_files(&[("/p/src/a.ts", "")]);
        let mut config = AnalyzerConfig::load(&fs, Path::new("/p")).unwrap();
        // Strip anything a developer's environment may have injected.
        config.walk_budget_ms = None;
        config.pairing_threshold = DEFAULT_PAIRING_THRESHOLD;
        config.max_file_bytes = DEFAULT_MAX_FILE_BYTES;
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn yaml_overrides_selected_fields() {
        let config =
            AnalyzerConfig::from_yaml("pairing_threshold: 3\nskip_dirs: [vendor]\n").unwrap();
        assert_eq!(config.pairing_threshold, 3);
        assert_eq!(config.skip_dirs, vec!["vendor"]);
        assert_eq!(config.test_name_markers, AnalyzerConfig::default().test_name_markers);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = AnalyzerConfig::from_yaml("pairing: 3\n").unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn env_overrides_apply_after_file() {
        let mut config = AnalyzerConfig::default();
        config
            .apply_overrides(|key| match key {
                "RIPPLE_PAIRING_THRESHOLD" => Some("4".to_string()),
                "RIPPLE_WALK_BUDGET_MS" => Some("250".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.pairing_threshold, 4);
        assert_eq!(config.walk_budget_ms, Some(250));
    }

    #[test]
    fn malformed_override_is_an_error() {
        let mut config = AnalyzerConfig::default();
        let err = config
            .apply_overrides(|key| (key == "RIPPLE_MAX_FILE_BYTES").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("RIPPLE_MAX_FILE_BYTES"));
    }
}
