use serde::{Deserialize, Serialize};

use super::{alignment_similarity, mean_match_cost, AlignmentError, Move, ScoreMatrix};

/// How the similarity of a merged pair is scored for the guide tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    /// Sum of match similarities minus the gap penalty per gap
    #[default]
    Traceback,
    /// Mean match cost scaled by alignment length (legacy scoring)
    MeanMatchCost,
}

impl SimilarityMethod {
    /// Score a traceback against its score matrix
    pub fn score(
        self,
        moves: &[Move],
        scores: &ScoreMatrix,
        gap_penalty: f64,
    ) -> Result<f64, AlignmentError> {
        match self {
            Self::Traceback => alignment_similarity(moves, scores, gap_penalty),
            Self::MeanMatchCost => mean_match_cost(moves, scores),
        }
    }
}

/// Parameters of a pairwise alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentParams {
    /// Retention-time tolerance `D` in seconds
    pub rt_tolerance: f64,

    /// Linear gap penalty `g`
    pub gap_penalty: f64,

    /// Similarity scoring used for guide-tree construction
    pub similarity: SimilarityMethod,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            rt_tolerance: 2.5,
            gap_penalty: 0.30,
            similarity: SimilarityMethod::Traceback,
        }
    }
}

impl AlignmentParams {
    /// Parameters with the given tolerance and gap penalty
    pub fn new(rt_tolerance: f64, gap_penalty: f64) -> Self {
        Self {
            rt_tolerance,
            gap_penalty,
            ..Self::default()
        }
    }

    /// Narrow retention window, cheap gaps (well-calibrated replicate runs)
    pub fn strict() -> Self {
        Self::new(1.0, 0.20)
    }

    /// Wide retention window, expensive gaps (runs with retention drift)
    pub fn relaxed() -> Self {
        Self::new(10.0, 0.50)
    }

    /// Replace the similarity method
    pub fn with_similarity(mut self, similarity: SimilarityMethod) -> Self {
        self.similarity = similarity;
        self
    }

    /// Check that `D` is finite and positive and `g` is finite and non-negative
    pub fn validate(&self) -> Result<(), AlignmentError> {
        if !(self.rt_tolerance.is_finite() && self.rt_tolerance > 0.0) {
            return Err(AlignmentError::InvalidParameter(format!(
                "rt_tolerance must be finite and > 0, got {}",
                self.rt_tolerance
            )));
        }
        if !(self.gap_penalty.is_finite() && self.gap_penalty >= 0.0) {
            return Err(AlignmentError::InvalidParameter(format!(
                "gap_penalty must be finite and >= 0, got {}",
                self.gap_penalty
            )));
        }
        Ok(())
    }
}

/// Complete configuration of a multi-experiment alignment run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentConfig {
    /// Pairwise alignment parameters
    pub params: AlignmentParams,

    /// Minimum number of non-gap cells for a column to survive
    pub min_peaks: usize,

    /// Report retention times in minutes rather than seconds
    pub minutes: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            params: AlignmentParams::default(),
            min_peaks: 1,
            minutes: true,
        }
    }
}

impl AlignmentConfig {
    /// Validate parameters and `min_peaks >= 1`
    pub fn validate(&self) -> Result<(), AlignmentError> {
        self.params.validate()?;
        if self.min_peaks == 0 {
            return Err(AlignmentError::InvalidParameter(
                "min_peaks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
