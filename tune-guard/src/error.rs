//! Error types for the tune-guard calibration table library.
//!
//! Every failure in this crate is a plain value returned to the caller. The
//! variants keep three situations apart that a calling UI must render
//! differently: malformed input (`UnrecognizedFormat`,
//! `ShapeInvariantViolation`), tables that cannot be compared (`AxisMismatch`),
//! and bad caller configuration.
//!
//! Individual malformed cells are *not* errors: they surface as `NaN` values
//! inside an otherwise valid table.

use thiserror::Error;

/// The main error type for the tune-guard library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TuneError {
    /// Text input does not start with a known legacy block header.
    #[error("Unrecognized table format: {header}")]
    UnrecognizedFormat {
        /// The first non-empty line of the input (possibly truncated)
        header: String,
    },

    /// The table data disagrees with its axes.
    #[error("Shape invariant violated: {message}")]
    ShapeInvariantViolation {
        /// Detailed error message naming the offending axis or index
        message: String,
    },

    /// A diff was requested between tables that do not share axes or layers.
    #[error("Axis mismatch on '{axis}': {message}")]
    AxisMismatch {
        /// Axis (or structural component such as "layers") that differs
        axis: String,
        /// Detailed error message
        message: String,
    },

    /// Error related to caller configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization of the wire format.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A type alias for `Result<T, TuneError>`.
///
/// # Examples
///
/// ```rust
/// use tune_guard::error::Result;
/// use tune_guard::legacy::parse;
///
/// fn load(block: &str) -> Result<usize> {
///     Ok(parse(block)?.cell_count())
/// }
/// ```
pub type Result<T> = std::result::Result<T, TuneError>;

impl TuneError {
    /// Creates a new unrecognized format error for the given header line.
    pub fn unrecognized_format(header: impl Into<String>) -> Self {
        Self::UnrecognizedFormat {
            header: header.into(),
        }
    }

    /// Creates a new shape invariant violation.
    pub fn shape(message: impl Into<String>) -> Self {
        Self::ShapeInvariantViolation {
            message: message.into(),
        }
    }

    /// Creates a new axis mismatch error.
    pub fn axis_mismatch(axis: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AxisMismatch {
            axis: axis.into(),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if the error describes malformed input rather than a
    /// comparison or configuration problem.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedFormat { .. }
                | Self::ShapeInvariantViolation { .. }
                | Self::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for TuneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TuneError::unrecognized_format("[Table4D]");
        assert_eq!(err.to_string(), "Unrecognized table format: [Table4D]");

        let err = TuneError::axis_mismatch("x", "label 2 differs");
        assert_eq!(err.to_string(), "Axis mismatch on 'x': label 2 differs");

        let err = TuneError::shape("row 1 has 3 cells, expected 4");
        assert!(err.to_string().contains("row 1 has 3 cells"));
    }

    #[test]
    fn test_malformed_input_classification() {
        assert!(TuneError::unrecognized_format("").is_malformed_input());
        assert!(TuneError::shape("bad").is_malformed_input());
        assert!(!TuneError::axis_mismatch("z", "layers").is_malformed_input());
        assert!(!TuneError::configuration("threshold").is_malformed_input());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: TuneError = serde_json::from_str::<Vec<f64>>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, TuneError::Serialization(_)));
    }
}
