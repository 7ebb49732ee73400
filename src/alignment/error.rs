/// Errors that can occur during peak-list alignment
#[derive(Debug, thiserror::Error)]
pub enum AlignmentError {
    /// An input that must contain data was empty
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Two peaks being compared do not share a mass axis
    #[error("Mass axis mismatch: expected {expected} points, found {found}")]
    MassAxisMismatch {
        /// Length of the first spectrum
        expected: usize,
        /// Length of the second spectrum
        found: usize,
    },

    /// Rows of an alignment have different lengths
    #[error("Row length mismatch: row {row} has {found} cells, expected {expected}")]
    RowLengthMismatch {
        /// Index of the offending row
        row: usize,
        /// Expected number of columns
        expected: usize,
        /// Actual number of cells
        found: usize,
    },

    /// Matrix or vector dimensions do not agree
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Parameter outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A traceback did not describe a path from (m, n) to (0, 0)
    #[error("Invalid traceback: {0}")]
    InvalidTraceback(String),

    /// Guide tree with dangling references, cycles or the wrong node count
    #[error("Malformed guide tree: {0}")]
    MalformedTree(String),

    /// The run was cancelled through its cancellation token
    #[error("Alignment cancelled")]
    Cancelled,
}
