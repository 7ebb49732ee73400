/// Errors raised while constructing or editing peaks
#[derive(Debug, thiserror::Error)]
pub enum PeakError {
    /// A numeric field was NaN or infinite
    #[error("Non-finite value for {field}: {value}")]
    NonFinite {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Mass list and intensity vector differ in length
    #[error("Mass spectrum data inconsistent: {masses} masses but {intensities} intensities")]
    InconsistentSpectrum {
        /// Number of m/z values
        masses: usize,
        /// Number of intensity values
        intensities: usize,
    },

    /// Tag is neither `rf-<name>` nor `blank`
    #[error("Incorrect reference peak tag '{0}'")]
    InvalidTag(String),

    /// Operation needs a mass spectrum that is empty
    #[error("Mass spectrum is empty")]
    EmptySpectrum,

    /// Requested mass range is invalid for this spectrum
    #[error("Invalid mass range: {0}")]
    InvalidMassRange(String),
}
