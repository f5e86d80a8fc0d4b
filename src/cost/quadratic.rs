use crate::cost::Cost;
use crate::error::MatrixError;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticCost;

impl Cost for QuadraticCost {
    /// Σ(target − guess)²
    fn evaluate(&self, guess: &Matrix, target: &Matrix) -> Result<f64, MatrixError> {
        let diff = target.sub(guess)?;
        Ok(diff.data().iter().flatten().map(|d| d * d).sum())
    }

    /// (guess − target) ⊙ f'(z); the constant factor 2 is left to the
    /// learning rate.
    fn output_error(
        &self,
        guess: &Matrix,
        target: &Matrix,
        output_layer: &Layer,
    ) -> Result<Matrix, MatrixError> {
        let diff = guess.sub(target)?;
        output_layer.activation_backward(&diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;
    use crate::layers::init::InitMethod;
    use crate::network::spec::LayerSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn evaluates_sum_of_squared_error() {
        let guess = Matrix::column_vector(&[0.5, 1.0, -1.0]);
        let target = Matrix::column_vector(&[1.0, 1.0, 1.0]);
        assert_eq!(QuadraticCost.evaluate(&guess, &target).unwrap(), 0.25 + 0.0 + 4.0);
        assert!(QuadraticCost.evaluate(&guess, &Matrix::column_vector(&[1.0])).is_err());
    }

    #[test]
    fn output_error_scales_by_activation_derivative() {
        let spec = LayerSpec::new(1, 1, Activation::Sigmoid, InitMethod::Zeros);
        let mut layer = Layer::new(&spec, &mut StdRng::seed_from_u64(0)).unwrap();
        // Zero weights and bias give a = sigmoid(0) = 0.5, f' = 0.25.
        let guess = layer.forward(&Matrix::column_vector(&[3.0])).unwrap();
        let target = Matrix::column_vector(&[1.0]);
        let err = QuadraticCost.output_error(&guess, &target, &layer).unwrap();
        assert_eq!(err.to_column_vec(), vec![-0.5 * 0.25]);
    }
}
