use thiserror::Error;

/// Result type alias for the engine
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Two vectors that must be compared have different lengths
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Normalization over a series whose min equals its max (or an empty series)
    #[error("degenerate range: series has no spread to normalize over")]
    DegenerateRange,

    /// Cosine similarity against a vector with zero magnitude
    #[error("zero vector: similarity is undefined for a zero-magnitude vector")]
    ZeroVector,

    #[error("division by zero: holding {index} has {field} == 0")]
    DivisionByZero { field: &'static str, index: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EngineError {
    /// Only transport failures are worth retrying; every numeric failure is
    /// deterministic given its inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_errors_are_not_retryable() {
        assert!(!EngineError::ZeroVector.is_retryable());
        assert!(!EngineError::DegenerateRange.is_retryable());
        assert!(!EngineError::DivisionByZero { field: "avg_cost", index: 3 }.is_retryable());
    }

    #[test]
    fn division_error_names_the_holding() {
        let msg = EngineError::DivisionByZero { field: "avg_volume", index: 2 }.to_string();
        assert!(msg.contains("holding 2"));
        assert!(msg.contains("avg_volume"));
    }
}
