/// Errors that can occur while exporting an alignment
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error creating or writing an output file
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV writing error: {0}")]
    CsvError(#[from] csv::Error),

    /// The alignment cannot be exported
    #[error("Cannot export alignment: {0}")]
    InvalidAlignment(String),
}
