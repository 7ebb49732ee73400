//! Processing history recorded alongside exported alignments.

mod error;

pub use error::ReportError;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::alignment::{AlignmentConfig, SimilarityMethod};

/// Data processing history for audit trail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingHistory {
    /// List of processing steps applied
    pub steps: Vec<ProcessingStep>,
}

/// A single data processing step in the processing history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStep {
    /// Step order (1-indexed)
    pub order: u32,

    /// Software name
    pub software: String,

    /// Software version
    pub version: Option<String>,

    /// Processing type (e.g., "peak alignment", "blank removal")
    pub processing_type: String,

    /// RFC 3339 timestamp when processing was performed
    pub timestamp: Option<String>,

    /// Processing parameters
    pub parameters: BTreeMap<String, String>,
}

impl ProcessingStep {
    /// Step performed now by this crate
    pub fn new(processing_type: impl Into<String>) -> Self {
        Self {
            order: 0,
            software: env!("CARGO_PKG_NAME").to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            processing_type: processing_type.into(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            parameters: BTreeMap::new(),
        }
    }

    /// Record a parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }

    /// Step describing a progressive alignment run
    pub fn alignment(config: &AlignmentConfig, experiments: usize) -> Self {
        let similarity = match config.params.similarity {
            SimilarityMethod::Traceback => "traceback",
            SimilarityMethod::MeanMatchCost => "mean_match_cost",
        };
        Self::new("peak alignment")
            .with_parameter("experiments", experiments)
            .with_parameter("rt_tolerance", config.params.rt_tolerance)
            .with_parameter("gap_penalty", config.params.gap_penalty)
            .with_parameter("similarity", similarity)
            .with_parameter("min_peaks", config.min_peaks)
            .with_parameter("minutes", config.minutes)
    }
}

impl ProcessingHistory {
    /// Create a new empty processing history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, numbering it after the existing ones
    pub fn add_step(&mut self, mut step: ProcessingStep) {
        step.order = self.steps.len() as u32 + 1;
        self.steps.push(step);
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the history as JSON to `path`
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a history written by [`ProcessingHistory::to_json_file`]
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
