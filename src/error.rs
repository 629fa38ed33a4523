//! Error types for configuration and input decoding.
//!
//! Data sparsity (short series, warm-up windows, empty input) is never an
//! error: those cases produce absent points or empty output instead.

use thiserror::Error;

/// Rejected configuration, raised before any computation starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A window length of zero
    #[error("{name} period must be at least 1, got {value}")]
    InvalidPeriod { name: &'static str, value: usize },

    /// Bollinger deviation multiplier that is negative or not finite
    #[error("bollinger deviation must be finite and non-negative, got {0}")]
    InvalidDeviation(f64),

    /// Timeframe of zero minutes
    #[error("timeframe must be at least 1 minute, got {0}")]
    InvalidTimeframe(u32),

    /// Fractal half-width of zero
    #[error("fractal width must be at least 1, got {0}")]
    InvalidFractalWidth(usize),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level error for callers driving the pipeline from JSON documents.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bar document is not a JSON array of bar records
    #[error("malformed bar document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
