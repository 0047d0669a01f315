// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Analysis configuration.
//!
//! This module defines the [`AnalysisConfig`] struct, which selects where rules and
//! reference sequences are loaded from and how reference comparison is calibrated.

use std::path::{Path, PathBuf};

use crate::compare::ComparisonConfig;
use crate::reference::ReferenceSource;
use crate::rules::RuleSource;

/// Configuration for a [`FormAnalyzer`](crate::FormAnalyzer).
///
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use formcheck::{AnalysisConfig, ReferenceSource};
///
/// let config = AnalysisConfig::new()
///     .with_rules_path("rules.csv")
///     .with_references_dir("references")
///     .with_demo_references(false);
///
/// assert!(matches!(config.reference_source(), ReferenceSource::Directory(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// CSV rule file. When `None` the built-in rule set is used.
    pub rules_path: Option<PathBuf>,
    /// Directory of `<exercise>_keypoints.json` reference files.
    pub references_dir: Option<PathBuf>,
    /// Whether the synthetic demo references are available.
    /// Files in `references_dir` take precedence over demo references.
    pub demo_references: bool,
    /// Reference comparison calibration.
    pub comparison: ComparisonConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            references_dir: None,
            demo_references: true,
            comparison: ComparisonConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration with default values.
    ///
    /// # Returns
    ///
    /// * A new `AnalysisConfig` using built-in rules and demo references.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CSV rule file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the rule file. A missing or malformed file falls back to the
    ///   built-in rules when the engine initializes.
    ///
    /// # Returns
    ///
    /// * The modified `AnalysisConfig`.
    #[must_use]
    pub fn with_rules_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.rules_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the reference directory.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory holding `<exercise>_keypoints.json` files.
    ///
    /// # Returns
    ///
    /// * The modified `AnalysisConfig`.
    #[must_use]
    pub fn with_references_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.references_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Enable or disable the demo references.
    ///
    /// # Arguments
    ///
    /// * `enabled` - `true` to include demo references.
    ///
    /// # Returns
    ///
    /// * The modified `AnalysisConfig`.
    #[must_use]
    pub const fn with_demo_references(mut self, enabled: bool) -> Self {
        self.demo_references = enabled;
        self
    }

    /// Set the comparison calibration.
    #[must_use]
    pub fn with_comparison(mut self, comparison: ComparisonConfig) -> Self {
        self.comparison = comparison;
        self
    }

    /// Rule source selected by this configuration.
    #[must_use]
    pub fn rule_source(&self) -> RuleSource {
        self.rules_path
            .as_ref()
            .map_or(RuleSource::Builtin, |path| RuleSource::Csv(path.clone()))
    }

    /// Reference source selected by this configuration.
    ///
    /// With neither a directory nor demo references the library is empty and every
    /// comparison reports a missing reference.
    #[must_use]
    pub fn reference_source(&self) -> ReferenceSource {
        match (&self.references_dir, self.demo_references) {
            (Some(dir), true) => ReferenceSource::Layered(dir.clone()),
            (Some(dir), false) => ReferenceSource::Directory(dir.clone()),
            (None, true) => ReferenceSource::Demo,
            (None, false) => ReferenceSource::Sequences(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = AnalysisConfig::default();
        assert!(config.rules_path.is_none());
        assert!(config.references_dir.is_none());
        assert!(config.demo_references);
        assert_eq!(config.comparison, ComparisonConfig::default());
        assert_eq!(config.rule_source(), RuleSource::Builtin);
        assert_eq!(config.reference_source(), ReferenceSource::Demo);
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::new()
            .with_rules_path("rules.csv")
            .with_references_dir("refs")
            .with_comparison(ComparisonConfig::new().with_sample_count(5));

        assert_eq!(config.rule_source(), RuleSource::Csv(PathBuf::from("rules.csv")));
        assert_eq!(
            config.reference_source(),
            ReferenceSource::Layered(PathBuf::from("refs"))
        );
        assert_eq!(config.comparison.sample_count, 5);
    }

    #[test]
    fn test_reference_source_without_demo() {
        let config = AnalysisConfig::new().with_demo_references(false);
        assert_eq!(config.reference_source(), ReferenceSource::Sequences(Vec::new()));

        let config = config.with_references_dir("refs");
        assert_eq!(
            config.reference_source(),
            ReferenceSource::Directory(PathBuf::from("refs"))
        );
    }
}
