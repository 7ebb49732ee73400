use crate::peak::PeakError;

/// Errors that can occur while preparing or loading experiments
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    /// I/O error reading or writing experiment files
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error serializing/deserializing JSON
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid peak data
    #[error("Peak error: {0}")]
    PeakError(#[from] PeakError),

    /// Experiment has no reference peaks at all
    #[error("Experiment '{0}': no reference peaks found")]
    NoReferencePeaks(String),

    /// Several peaks carry the same reference tag
    #[error("Experiment '{code}': multiple reference peaks with the tag 'rf-{tag}'")]
    DuplicateReference {
        /// Experiment code
        code: String,
        /// Duplicated reference name
        tag: String,
    },

    /// Requested reference peak is not present
    #[error("Experiment '{code}': specified reference peak '{tag}' not found")]
    ReferenceNotFound {
        /// Experiment code
        code: String,
        /// Requested reference name
        tag: String,
    },

    /// Reference normalisation requested before a reference peak was set
    #[error("Experiment '{0}': reference peak not set")]
    ReferenceNotSet(String),

    /// Invalid argument to an experiment operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed time string such as `"12x"`
    #[error("Invalid time string '{0}': expected '<number>s' or '<number>m'")]
    InvalidTimeString(String),
}
