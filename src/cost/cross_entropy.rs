use crate::cost::Cost;
use crate::error::MatrixError;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

/// Binary cross-entropy over the output neurons.
///
/// Not clamped: a guess of exactly 0 or 1 yields ±∞ or NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyCost;

impl Cost for CrossEntropyCost {
    /// −mean(y·ln(a) + (1 − y)·ln(1 − a))
    fn evaluate(&self, guess: &Matrix, target: &Matrix) -> Result<f64, MatrixError> {
        let per_neuron = guess.zip_with(target, "cross_entropy", |a, y| {
            -(y * a.ln() + (1.0 - y) * (1.0 - a).ln())
        })?;
        Ok(per_neuron.sum() / (guess.rows() * guess.cols()) as f64)
    }

    /// guess − target, the combined cost/activation gradient for sigmoid and
    /// softmax outputs.
    fn output_error(
        &self,
        guess: &Matrix,
        target: &Matrix,
        _output_layer: &Layer,
    ) -> Result<Matrix, MatrixError> {
        guess.sub(target)
    }
}
