//! Column-pair scoring between two alignments.
//!
//! Each pair of peaks contributes `cosine * exp(-((rt1 - rt2) / D)^2 / 2)`.
//! A cell of the score matrix is one minus the mean contribution over every
//! pair of non-gap peaks in the two columns, so lower values mean better
//! matches.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{Alignment, AlignmentError, DenseMatrix};
use crate::peak::MassSpectrum;

/// Score assigned to a column pair with no contributing peak pairs
pub const MAX_SCORE: f64 = 1.0;

/// Cost matrix between the columns of two alignments
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    /// `scores[(i, j)]` is the cost of matching column `i` of A with column `j` of B
    pub scores: DenseMatrix<f64>,
    /// Number of peak pairs averaged into each score
    pub counts: DenseMatrix<usize>,
}

impl ScoreMatrix {
    /// `(cols(A), cols(B))`
    pub fn shape(&self) -> (usize, usize) {
        self.scores.shape()
    }
}

/// Cosine of the angle between two intensity vectors
///
/// Spectra must share a mass axis. A spectrum with zero norm has no direction
/// and scores 0.0 against anything.
pub fn cosine_similarity(a: &MassSpectrum, b: &MassSpectrum) -> Result<f64, AlignmentError> {
    let norms = (a.norm(), b.norm());
    cosine_with_norms(&a.intensities, norms.0, &b.intensities, norms.1)
}

fn cosine_with_norms(a: &[f64], norm_a: f64, b: &[f64], norm_b: f64) -> Result<f64, AlignmentError> {
    if a.len() != b.len() {
        return Err(AlignmentError::MassAxisMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    let denom = norm_a * norm_b;
    if denom == 0.0 {
        return Ok(0.0);
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    Ok(dot / denom)
}

/// Gaussian retention-time proximity, 1.0 at equal times
#[inline]
pub fn rt_modulation(rt1: f64, rt2: f64, rt_tolerance: f64) -> f64 {
    let z = (rt1 - rt2) / rt_tolerance;
    (-z * z / 2.0).exp()
}

/// Peak data needed for scoring, with the spectrum norm cached
struct ScoredPeak<'a> {
    rt: f64,
    intensities: &'a [f64],
    norm: f64,
}

fn column_peaks(alignment: &Alignment) -> Vec<Vec<ScoredPeak<'_>>> {
    (0..alignment.ncols())
        .map(|col| {
            alignment
                .column_peaks(col)
                .map(|p| ScoredPeak {
                    rt: p.retention_time,
                    intensities: &p.mass_spectrum.intensities,
                    norm: p.mass_spectrum.norm(),
                })
                .collect()
        })
        .collect()
}

fn score_row(
    column: &[ScoredPeak<'_>],
    others: &[Vec<ScoredPeak<'_>>],
    rt_tolerance: f64,
) -> Result<(Vec<f64>, Vec<usize>), AlignmentError> {
    let mut scores = Vec::with_capacity(others.len());
    let mut counts = Vec::with_capacity(others.len());

    for other in others {
        let mut sum = 0.0;
        let mut count = 0usize;
        for p1 in column {
            for p2 in other {
                let cos = cosine_with_norms(p1.intensities, p1.norm, p2.intensities, p2.norm)?;
                sum += cos * rt_modulation(p1.rt, p2.rt, rt_tolerance);
                count += 1;
            }
        }
        scores.push(if count == 0 {
            MAX_SCORE
        } else {
            1.0 - sum / count as f64
        });
        counts.push(count);
    }

    Ok((scores, counts))
}

/// Score every column of `a` against every column of `b`
///
/// `rt_tolerance` is the retention-time scale `D` in seconds and must be
/// positive.
pub fn score_matrix(
    a: &Alignment,
    b: &Alignment,
    rt_tolerance: f64,
) -> Result<ScoreMatrix, AlignmentError> {
    if !(rt_tolerance.is_finite() && rt_tolerance > 0.0) {
        return Err(AlignmentError::InvalidParameter(format!(
            "retention time tolerance must be positive, got {}",
            rt_tolerance
        )));
    }

    let cols_a = column_peaks(a);
    let cols_b = column_peaks(b);

    #[cfg(feature = "parallel")]
    let rows: Vec<(Vec<f64>, Vec<usize>)> = cols_a
        .par_iter()
        .map(|column| score_row(column, &cols_b, rt_tolerance))
        .collect::<Result<_, _>>()?;

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<(Vec<f64>, Vec<usize>)> = cols_a
        .iter()
        .map(|column| score_row(column, &cols_b, rt_tolerance))
        .collect::<Result<_, _>>()?;

    let (m, n) = (a.ncols(), b.ncols());
    let mut scores = Vec::with_capacity(m * n);
    let mut counts = Vec::with_capacity(m * n);
    for (row_scores, row_counts) in rows {
        scores.extend(row_scores);
        counts.extend(row_counts);
    }

    Ok(ScoreMatrix {
        scores: DenseMatrix::from_vec(m, n, scores)?,
        counts: DenseMatrix::from_vec(m, n, counts)?,
    })
}
