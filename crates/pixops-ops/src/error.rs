//! Error types for pixel operations.

use thiserror::Error;

/// Error type for pixel operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    /// Buffer access or region error from `pixops-core`.
    #[error(transparent)]
    Core(#[from] pixops_core::Error),

    /// Kernel is malformed (even size, wrong weight count, bad blend factor).
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// A named option (filter, edge policy) was not recognised.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Crop selection has zero width or zero height.
    #[error("empty selection: crop region has zero area")]
    EmptySelection,

    /// Scale factor is not a positive finite number.
    #[error("invalid scale factor: {0}")]
    InvalidScale(f64),

    /// The controller has no buffer loaded.
    #[error("no image loaded")]
    NoImage,

    /// A selection was ended without being started.
    #[error("no selection in progress")]
    NoSelection,
}

/// Result type for pixel operations.
pub type OpsResult<T> = Result<T, OpsError>;
