//! Progress events and cooperative cancellation for long alignment runs.
//!
//! The aligner never prints. It reports milestones as [`ProgressEvent`]s to a
//! [`ProgressObserver`] and polls a [`CancellationToken`] between pairwise
//! alignments and between progressive merges.

use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::AlignmentError;

/// Milestones of a multi-experiment alignment
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// All-pairs similarity computation started
    PairwiseStarted {
        /// Number of input alignments
        inputs: usize,
        /// Number of pairwise alignments to run
        pairs: usize,
    },
    /// One pairwise alignment finished
    PairwiseAligned {
        /// First input index
        first: usize,
        /// Second input index
        second: usize,
        /// Similarity of the pair
        similarity: f64,
    },
    /// Guide tree built
    ClusteringDone {
        /// Number of internal nodes
        nodes: usize,
    },
    /// Progressive merging started
    MergeStarted {
        /// Number of merges to perform
        merges: usize,
    },
    /// One progressive merge finished
    Merged {
        /// Merges still to perform
        remaining: usize,
        /// Columns in the merged alignment
        columns: usize,
    },
    /// Sparse columns removed from the final alignment
    Filtered {
        /// Columns before filtering
        before: usize,
        /// Columns after filtering
        after: usize,
    },
}

/// Receives progress events
pub trait ProgressObserver: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &ProgressEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::PairwiseStarted { inputs, pairs } => {
                info!("Computing {} pairwise alignments over {} inputs", pairs, inputs)
            }
            ProgressEvent::PairwiseAligned {
                first,
                second,
                similarity,
            } => debug!("Aligned {} with {} (similarity {:.4})", first, second, similarity),
            ProgressEvent::ClusteringDone { nodes } => {
                info!("Guide tree built with {} merge nodes", nodes)
            }
            ProgressEvent::MergeStarted { merges } => {
                info!("Aligning with guide tree ({} merges)", merges)
            }
            ProgressEvent::Merged { remaining, columns } => {
                debug!("Merged into {} columns, {} merges remaining", columns, remaining)
            }
            ProgressEvent::Filtered { before, after } => {
                info!("Kept {} of {} aligned positions", after, before)
            }
        }
    }
}

/// Shared flag requesting that a run stop at the next checkpoint
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// New token in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`CancellationToken::cancel`] was called on any clone
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` when cancellation was requested
    pub fn check(&self) -> Result<(), AlignmentError> {
        if self.is_cancelled() {
            Err(AlignmentError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Observer and cancellation token threaded through a run
#[derive(Clone)]
pub struct RunContext {
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
    parallel: bool,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            observer: Arc::new(NoProgress),
            cancel: CancellationToken::new(),
            parallel: false,
        }
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl RunContext {
    /// Silent context that is never cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Report events to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Stop when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run pairwise alignments on the rayon pool (requires the `parallel` feature)
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether parallel execution was requested
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// The cancellation token
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        self.observer.on_event(&event);
    }

    pub(crate) fn checkpoint(&self) -> Result<(), AlignmentError> {
        self.cancel.check()
    }
}
