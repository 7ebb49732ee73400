//! # Peak-List Alignment
//!
//! Dynamic-programming alignment of GC-MS peak lists across experiments.
//!
//! ## Pipeline
//!
//! 1. **Scoring**: every column of one alignment is compared with every column
//!    of another by spectral cosine similarity damped by a Gaussian of the
//!    retention-time difference ([`score_matrix`]).
//!
//! 2. **Dynamic programming**: a Needleman-Wunsch pass over the score matrix
//!    with a linear gap penalty yields the optimal path ([`dp`]).
//!
//! 3. **Merging**: the path is replayed to build a wider alignment with gaps,
//!    whose columns are then ordered by mean retention time
//!    ([`merge_alignments`]).
//!
//! 4. **Guide tree**: all pairs of inputs are aligned, their similarities turned
//!    into distances and clustered by average linkage ([`PairwiseAlignment`]).
//!
//! 5. **Progressive alignment**: inputs are merged children-first along the
//!    guide tree and sparse columns are filtered out ([`align_with_tree`]).
//!
//! ## Example
//!
//! ```rust,ignore
//! use peakalign::alignment::{align_with_tree, AlignmentParams, PairwiseAlignment, RunContext};
//!
//! let params = AlignmentParams::new(2.5, 0.30);
//! let ctx = RunContext::new();
//! let pairwise = PairwiseAlignment::from_experiments(&experiments, &params, &ctx)?;
//! let consensus = align_with_tree(pairwise, 2, &ctx)?;
//! ```

mod config;
mod dp;
mod error;
mod matrix;
mod merge;
mod pairwise;
mod progress;
mod progressive;
mod score;
mod tree;
mod types;

#[cfg(test)]
mod tests;

pub use config::{AlignmentConfig, AlignmentParams, SimilarityMethod};
pub use dp::{dp, dp_with_retention_order, DpResult, Move};
pub use error::AlignmentError;
pub use matrix::DenseMatrix;
pub use merge::{alignment_similarity, mean_match_cost, merge_alignments};
pub use pairwise::{align, PairwiseAlignment};
pub use progress::{
    CancellationToken, LogProgress, NoProgress, ProgressEvent, ProgressObserver, RunContext,
};
pub use progressive::align_with_tree;
pub use score::{cosine_similarity, rt_modulation, score_matrix, ScoreMatrix, MAX_SCORE};
pub use tree::{GuideTree, NodeRef, TreeNode};
pub use types::{experiments_to_alignments, Alignment, Cell};
