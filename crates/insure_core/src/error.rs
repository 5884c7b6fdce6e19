use thiserror::Error;

/// Errors raised while validating parameters, before any simulation starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("multiplier must be non-negative (got {0})")]
    NegativeMultiplier(f64),

    #[error("floor ratio must lie in [0, 1] (got {0})")]
    FloorRatioOutOfRange(f64),

    #[error("max drawdown must lie in [0, 1) (got {0})")]
    DrawdownOutOfRange(f64),

    #[error("cap ratio {cap} must be above the floor ratio {floor}")]
    CapBelowFloor { cap: f64, floor: f64 },

    #[error("invalid {model} parameters: {reason}")]
    InvalidModel {
        model: &'static str,
        reason: &'static str,
    },

    #[error("no return paths supplied")]
    EmptyPaths,

    #[error("return path {index} has {actual} periods, expected {expected}")]
    RaggedPaths {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Errors returned by the allocator and batch runner
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CppiError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("risky series has {risky} periods but safe series has {safe}")]
    LengthMismatch { risky: usize, safe: usize },

    #[error("batch has {risky} risky paths but {safe} safe paths")]
    PathCountMismatch { risky: usize, safe: usize },
}

pub type Result<T> = std::result::Result<T, CppiError>;

/// Reject NaN and infinities for a named field
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> std::result::Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> std::result::Result<f64, ConfigError> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
