pub mod cost_type;
pub mod cross_entropy;
pub mod quadratic;

use std::fmt;

use crate::error::MatrixError;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

pub use cost_type::CostFunction;
pub use cross_entropy::CrossEntropyCost;
pub use quadratic::QuadraticCost;

/// A cost function and the error it seeds backpropagation with.
pub trait Cost: fmt::Debug + Send + Sync {
    /// Scalar cost of `guess` against `target`.
    fn evaluate(&self, guess: &Matrix, target: &Matrix) -> Result<f64, MatrixError>;

    /// Error vector for the output layer, i.e. ∂C/∂z of its neurons.
    fn output_error(
        &self,
        guess: &Matrix,
        target: &Matrix,
        output_layer: &Layer,
    ) -> Result<Matrix, MatrixError>;
}
