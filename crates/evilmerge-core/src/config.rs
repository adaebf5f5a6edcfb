use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EvilMergeError;
use crate::types::OutputFormat;

/// Top-level configuration loaded from `.evilmerge.toml`.
///
/// Resolution order: CLI flags > config file > defaults.
///
/// # Examples
///
/// ```
/// use evilmerge_core::EvilMergeConfig;
///
/// let config = EvilMergeConfig::default();
/// assert_eq!(config.analysis.abbrev_length, 7);
/// assert!(config.analysis.detect_renames);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvilMergeConfig {
    /// Detector settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Report settings.
    #[serde(default)]
    pub output: OutputConfig,
}

impl EvilMergeConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EvilMergeError::FileNotFound`] if `path` does not exist,
    /// [`EvilMergeError::Io`] if it cannot be read, or
    /// [`EvilMergeError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use evilmerge_core::EvilMergeConfig;
    /// use std::path::Path;
    ///
    /// let config = EvilMergeConfig::from_file(Path::new(".evilmerge.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, EvilMergeError> {
        if !path.exists() {
            return Err(EvilMergeError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`EvilMergeError::Toml`] if parsing fails, or
    /// [`EvilMergeError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use evilmerge_core::EvilMergeConfig;
    ///
    /// let toml = r#"
    /// [analysis]
    /// abbrev_length = 12
    /// "#;
    /// let config = EvilMergeConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.analysis.abbrev_length, 12);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, EvilMergeError> {
        let config: Self = toml::from_str(content)?;
        if config.analysis.abbrev_length == 0 {
            return Err(EvilMergeError::Config(
                "analysis.abbrev_length must be at least 1".into(),
            ));
        }
        Ok(config)
    }
}

/// Detector configuration.
///
/// # Examples
///
/// ```
/// use evilmerge_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.context_lines, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Prefix length used when printing commit ids (default: 7).
    #[serde(default = "default_abbrev_length")]
    pub abbrev_length: usize,
    /// Enable rename detection when computing unified diffs (default: true).
    #[serde(default = "default_detect_renames")]
    pub detect_renames: bool,
    /// Context radius of generated interdiffs (default: 3).
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

fn default_abbrev_length() -> usize {
    7
}

fn default_detect_renames() -> bool {
    true
}

fn default_context_lines() -> usize {
    3
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            abbrev_length: default_abbrev_length(),
            detect_renames: default_detect_renames(),
            context_lines: default_context_lines(),
        }
    }
}

/// Report configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format used when `--format` is not given.
    #[serde(default)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = EvilMergeConfig::default();
        assert_eq!(config.analysis.abbrev_length, 7);
        assert!(config.analysis.detect_renames);
        assert_eq!(config.analysis.context_lines, 3);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[analysis]
abbrev_length = 10
detect_renames = false
context_lines = 5

[output]
format = "json"
"#;
        let config = EvilMergeConfig::from_toml(toml).unwrap();
        assert_eq!(config.analysis.abbrev_length, 10);
        assert!(!config.analysis.detect_renames);
        assert_eq!(config.analysis.context_lines, 5);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EvilMergeConfig::from_toml("").unwrap();
        assert_eq!(config.analysis.abbrev_length, 7);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = EvilMergeConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(EvilMergeError::Toml(_))));
    }

    #[test]
    fn zero_abbrev_length_is_rejected() {
        let result = EvilMergeConfig::from_toml("[analysis]\nabbrev_length = 0\n");
        assert!(matches!(result, Err(EvilMergeError::Config(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = EvilMergeConfig::from_file(Path::new("/nonexistent/.evilmerge.toml"));
        assert!(matches!(result, Err(EvilMergeError::FileNotFound(_))));
    }
}
