//! TOML configuration file support for power users.
//!
//! Instead of passing many CLI flags, users can specify settings in a config file:
//!
//! ```toml
//! # peakalign.toml
//! [alignment]
//! rt_tolerance = 2.5
//! gap_penalty = 0.30
//! min_peaks = 2
//! minutes = true
//! similarity = "traceback"
//! parallel = true
//! ```
//!
//! Command-line flags override values from the file, which override defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use peakalign::alignment::{AlignmentConfig, SimilarityMethod};

/// Root configuration structure for peakalign.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Alignment-specific settings.
    #[serde(default)]
    pub alignment: AlignmentSection,
}

/// Configuration for the align command.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignmentSection {
    /// Retention-time tolerance in seconds.
    pub rt_tolerance: Option<f64>,

    /// Linear gap penalty.
    pub gap_penalty: Option<f64>,

    /// Minimum number of peaks for an aligned position to be kept.
    pub min_peaks: Option<usize>,

    /// Write retention times in minutes.
    pub minutes: Option<bool>,

    /// Similarity used to build the guide tree.
    pub similarity: Option<SimilarityMethod>,

    /// Run pairwise alignments in parallel (requires the parallel feature).
    pub parallel: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

impl AlignmentSection {
    /// Defaults overlaid with the values present in the file.
    pub fn to_alignment_config(&self) -> AlignmentConfig {
        let mut config = AlignmentConfig::default();
        if let Some(d) = self.rt_tolerance {
            config.params.rt_tolerance = d;
        }
        if let Some(g) = self.gap_penalty {
            config.params.gap_penalty = g;
        }
        if let Some(method) = self.similarity {
            config.params.similarity = method;
        }
        if let Some(k) = self.min_peaks {
            config.min_peaks = k;
        }
        if let Some(minutes) = self.minutes {
            config.minutes = minutes;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [alignment]
            rt_tolerance = 5.0
            gap_penalty = 0.2
            min_peaks = 2
            minutes = false
            similarity = "mean_match_cost"
            parallel = true
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.alignment.rt_tolerance, Some(5.0));
        assert_eq!(config.alignment.parallel, Some(true));

        let resolved = config.alignment.to_alignment_config();
        assert_eq!(resolved.params.rt_tolerance, 5.0);
        assert_eq!(resolved.params.gap_penalty, 0.2);
        assert_eq!(resolved.params.similarity, SimilarityMethod::MeanMatchCost);
        assert_eq!(resolved.min_peaks, 2);
        assert!(!resolved.minutes);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [alignment]
            gap_penalty = 0.5
        "#;

        let config = Config::from_str(toml).unwrap();
        let resolved = config.alignment.to_alignment_config();
        assert_eq!(resolved.params.gap_penalty, 0.5);
        assert_eq!(resolved.params.rt_tolerance, 2.5);
        assert_eq!(resolved.min_peaks, 1);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.alignment.rt_tolerance, None);
        assert_eq!(config.alignment.to_alignment_config(), AlignmentConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_str("[alignment]\ngap = 0.3\n").is_err());
    }
}
