/// Errors that can occur while saving or loading a processing history
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// I/O error reading or writing the history file
    #[error("Failed to access history file: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}
