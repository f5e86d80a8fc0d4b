//! Error types for matrix and network operations.
//!
//! Every error here signals a programming or configuration mistake (wrong
//! shapes, a singular system, a mis-assembled network). None of them are
//! transient, so callers should not retry.

use thiserror::Error;

/// Failures raised by [`Matrix`](crate::Matrix) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Operand shapes are incompatible for `op`. Shapes are `(rows, cols)`.
    #[error("dimension mismatch in {op}: left is {left:?}, right is {right:?}")]
    Dimension {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Gaussian elimination met an exact-zero pivot.
    #[error("matrix is singular: zero pivot in column {column}")]
    Singular { column: usize },

    #[error("index ({row}, {col}) is out of bounds for a {shape:?} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        shape: (usize, usize),
    },

    /// Construction data, or an operand of a decomposition, has no rows or
    /// no columns.
    #[error("matrix must have at least one row and one column")]
    Empty,

    #[error("ragged matrix data: row {row} has {found} elements, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Failures raised while building, running or persisting a
/// [`Network`](crate::Network).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    /// `layer_builder` was called after every declared slot was filled.
    #[error("layer out of bounds: the network declares {capacity} layers")]
    LayerBounds { capacity: usize },

    /// Output width of `layer` differs from the input width of `layer + 1`.
    #[error(
        "network integrity error at layer {layer}: outputs {outputs}, next layer inputs {next_inputs}"
    )]
    Integrity {
        layer: usize,
        outputs: usize,
        next_inputs: usize,
    },

    #[error("network is incomplete: {built} of {capacity} layers built")]
    Incomplete { built: usize, capacity: usize },

    #[error("invalid layer shape: {inputs} inputs, {neurons} neurons")]
    InvalidLayer { inputs: usize, neurons: usize },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("sample count mismatch: {samples} samples, {targets} targets")]
    SampleCountMismatch { samples: usize, targets: usize },

    #[error("mini-batch size must be at least 1, got {size}")]
    InvalidMiniBatch { size: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-wide result alias; defaults to [`NetworkError`].
pub type Result<T, E = NetworkError> = std::result::Result<T, E>;
