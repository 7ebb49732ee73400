//! # peakalign - GC-MS Peak List Alignment
//!
//! `peakalign` aligns peak lists detected in several GC-MS runs into one
//! consensus table, so that the same compound lines up across experiments for
//! statistical comparison.
//!
//! ## Key Features
//!
//! - **Spectral and Temporal Scoring**: Peaks are compared by the cosine of
//!   their mass spectra, damped by a Gaussian of their retention-time
//!   difference.
//!
//! - **Dynamic Programming Alignment**: Needleman-Wunsch global alignment with
//!   a linear gap penalty and deterministic tie-breaking.
//!
//! - **Progressive Multiple Alignment**: All pairs of experiments are aligned,
//!   clustered by average linkage into a guide tree, and merged children-first.
//!
//! - **Embeddable**: The aligner never prints. Progress is reported through an
//!   observer trait and long runs can be cancelled cooperatively.
//!
//! ## Quick Start
//!
//! ```rust
//! use peakalign::prelude::*;
//!
//! let spectrum = MassSpectrum::new(vec![73.0, 147.0], vec![100.0, 40.0])?;
//! let run = |code: &str, rts: &[f64]| -> Result<Experiment, PeakError> {
//!     let peaks = rts
//!         .iter()
//!         .map(|&rt| Peak::new(rt, 1000.0).map(|p| p.with_mass_spectrum(spectrum.clone())))
//!         .collect::<Result<Vec<_>, _>>()?;
//!     Ok(Experiment::new(code, peaks))
//! };
//! let experiments = vec![
//!     run("a", &[10.0, 20.0, 30.0])?,
//!     run("b", &[10.0, 30.0])?,
//! ];
//!
//! let params = AlignmentParams::new(5.0, 0.5);
//! let ctx = RunContext::new();
//! let pairwise = PairwiseAlignment::from_experiments(&experiments, &params, &ctx)?;
//! let consensus = align_with_tree(pairwise, 1, &ctx)?;
//!
//! assert_eq!(consensus.ncols(), 3);
//! assert_eq!(consensus.gap_count(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`peak`]: peak and mass spectrum value types
//! - [`experiment`]: peak lists of single runs, their preparation and persistence
//! - [`alignment`]: scoring, dynamic programming, merging, guide tree and
//!   progressive alignment
//! - [`export`]: CSV tables of retention times, areas and composite peaks
//! - [`report`]: processing history written next to exported tables
//! - [`validator`]: pre-flight checks of an experiment set

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod alignment;
pub mod experiment;
pub mod export;
pub mod peak;
pub mod report;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::alignment::{
        align, align_with_tree, experiments_to_alignments, Alignment, AlignmentConfig,
        AlignmentError, AlignmentParams, CancellationToken, Cell, GuideTree, LogProgress,
        PairwiseAlignment, ProgressEvent, ProgressObserver, RunContext, SimilarityMethod,
    };
    pub use crate::experiment::{read_experiment_list, Experiment, ExperimentError};
    pub use crate::export::{write_composite_csv, write_csv, ExportError};
    pub use crate::peak::{MassSpectrum, Peak, PeakError, PeakTag};
    pub use crate::report::{ProcessingHistory, ProcessingStep};
    pub use crate::validator::{validate_experiments, ValidationReport};
}
