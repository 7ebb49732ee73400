//! Pairwise alignment and the all-pairs guide-tree builder.

use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{
    dp, experiments_to_alignments, merge_alignments, score_matrix, Alignment, AlignmentError,
    AlignmentParams, DenseMatrix, GuideTree, ProgressEvent, RunContext,
};
use crate::experiment::Experiment;

/// Align two alignments: score, dynamic programming, merge, then record similarity
pub fn align(
    a: &Alignment,
    b: &Alignment,
    params: &AlignmentParams,
) -> Result<Alignment, AlignmentError> {
    params.validate()?;
    check_has_peaks(a)?;
    check_has_peaks(b)?;
    let scores = score_matrix(a, b, params.rt_tolerance)?;
    let result = dp(&scores.scores, params.gap_penalty)?;
    let mut merged = merge_alignments(a, b, &result.moves)?;
    let similarity = params
        .similarity
        .score(&result.moves, &scores, params.gap_penalty)?;
    merged.set_similarity(similarity);
    debug!(
        "Merged {}x{} columns into {} ({} gaps, similarity {:.4})",
        a.ncols(),
        b.ncols(),
        merged.ncols(),
        result.gap_count(),
        similarity
    );
    Ok(merged)
}

/// An alignment without columns comes from an empty peak list
fn check_has_peaks(alignment: &Alignment) -> Result<(), AlignmentError> {
    if alignment.ncols() == 0 {
        return Err(AlignmentError::EmptyInput(format!(
            "experiment '{}' has no peaks",
            alignment.expr_codes().join(", ")
        )));
    }
    Ok(())
}

fn pair_similarity(
    a: &Alignment,
    b: &Alignment,
    params: &AlignmentParams,
) -> Result<f64, AlignmentError> {
    let scores = score_matrix(a, b, params.rt_tolerance)?;
    let result = dp(&scores.scores, params.gap_penalty)?;
    params
        .similarity
        .score(&result.moves, &scores, params.gap_penalty)
}

/// All-pairs similarities of a set of alignments and the guide tree built from them
///
/// The similarity matrix is symmetric with an unset (NaN) diagonal. Distances
/// are `max(similarity) - similarity` with a zero diagonal. Fewer than two
/// inputs need no tree.
#[derive(Debug, Clone)]
pub struct PairwiseAlignment {
    pub(crate) alignments: Vec<Alignment>,
    pub(crate) params: AlignmentParams,
    sim_matrix: DenseMatrix<f64>,
    dist_matrix: DenseMatrix<f64>,
    pub(crate) tree: Option<GuideTree>,
}

impl PairwiseAlignment {
    /// Align every pair of `alignments` and cluster the result
    ///
    /// Every input must hold at least one peak; an empty peak list is
    /// rejected with [`AlignmentError::EmptyInput`].
    pub fn new(
        alignments: Vec<Alignment>,
        params: &AlignmentParams,
        ctx: &RunContext,
    ) -> Result<Self, AlignmentError> {
        params.validate()?;
        alignments.iter().try_for_each(check_has_peaks)?;
        let n = alignments.len();

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        ctx.emit(ProgressEvent::PairwiseStarted {
            inputs: n,
            pairs: pairs.len(),
        });
        info!(
            "Calculating pairwise alignments for {} alignments (D={:.2}, gap={:.2})",
            n, params.rt_tolerance, params.gap_penalty
        );

        let run_pair = |&(i, j): &(usize, usize)| -> Result<f64, AlignmentError> {
            ctx.checkpoint()?;
            let similarity = pair_similarity(&alignments[i], &alignments[j], params)?;
            ctx.emit(ProgressEvent::PairwiseAligned {
                first: i,
                second: j,
                similarity,
            });
            Ok(similarity)
        };

        #[cfg(feature = "parallel")]
        let similarities: Vec<f64> = if ctx.parallel() {
            pairs.par_iter().map(run_pair).collect::<Result<_, _>>()?
        } else {
            pairs.iter().map(run_pair).collect::<Result<_, _>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let similarities: Vec<f64> = pairs.iter().map(run_pair).collect::<Result<_, _>>()?;

        let mut sim_matrix = DenseMatrix::filled(n, n, f64::NAN);
        for (&(i, j), &s) in pairs.iter().zip(&similarities) {
            sim_matrix[(i, j)] = s;
            sim_matrix[(j, i)] = s;
        }

        let max = sim_matrix.max().unwrap_or(0.0);
        let mut dist_matrix = DenseMatrix::filled(n, n, 0.0);
        for &(i, j) in &pairs {
            let d = max - sim_matrix[(i, j)];
            dist_matrix[(i, j)] = d;
            dist_matrix[(j, i)] = d;
        }

        let tree = if n > 1 {
            let tree = GuideTree::average_linkage(&dist_matrix)?;
            ctx.emit(ProgressEvent::ClusteringDone {
                nodes: tree.nodes().len(),
            });
            Some(tree)
        } else {
            None
        };

        Ok(Self {
            alignments,
            params: *params,
            sim_matrix,
            dist_matrix,
            tree,
        })
    }

    /// Convert experiments to singleton alignments, then run [`PairwiseAlignment::new`]
    pub fn from_experiments(
        experiments: &[Experiment],
        params: &AlignmentParams,
        ctx: &RunContext,
    ) -> Result<Self, AlignmentError> {
        Self::new(experiments_to_alignments(experiments), params, ctx)
    }

    /// Input alignments, in leaf order
    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    /// Number of inputs
    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    /// True when there are no inputs
    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    /// Parameters used for every pairwise alignment
    pub fn params(&self) -> &AlignmentParams {
        &self.params
    }

    /// Pairwise similarity matrix
    pub fn sim_matrix(&self) -> &DenseMatrix<f64> {
        &self.sim_matrix
    }

    /// Distance matrix derived from the similarities
    pub fn dist_matrix(&self) -> &DenseMatrix<f64> {
        &self.dist_matrix
    }

    /// Guide tree, present for two or more inputs
    pub fn tree(&self) -> Option<&GuideTree> {
        self.tree.as_ref()
    }
}
