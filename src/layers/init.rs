use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::matrix::Matrix;

/// How a layer's weights and biases are filled at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitMethod {
    Zeros,
    /// Uniform in `[-0.5, 0.5)`.
    Random,
    /// N(0, 1).
    Gaussian,
    /// N(0, sqrt(1 / inputs)) weights, zero biases.
    Xavier,
    /// N(0, sqrt(2 / inputs)) weights, zero biases.
    He,
}

impl InitMethod {
    /// `neurons × inputs` weight matrix.
    pub fn weights<R: Rng + ?Sized>(self, neurons: usize, inputs: usize, rng: &mut R) -> Matrix {
        match self {
            InitMethod::Zeros => Matrix::zeros(neurons, inputs),
            InitMethod::Random => Matrix::random(neurons, inputs, rng),
            InitMethod::Gaussian => Matrix::gaussian(neurons, inputs, rng),
            InitMethod::Xavier => Matrix::xavier(neurons, inputs, rng),
            InitMethod::He => Matrix::he(neurons, inputs, rng),
        }
    }

    /// `neurons × 1` bias vector.
    pub fn biases<R: Rng + ?Sized>(self, neurons: usize, rng: &mut R) -> Matrix {
        match self {
            InitMethod::Random => Matrix::random(neurons, 1, rng),
            InitMethod::Gaussian => Matrix::gaussian(neurons, 1, rng),
            InitMethod::Zeros | InitMethod::Xavier | InitMethod::He => Matrix::zeros(neurons, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fan_in_scaled_methods_shrink_with_wide_inputs() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = InitMethod::Xavier.weights(200, 400, &mut rng);
        assert_eq!(w.shape(), (200, 400));
        let n = (w.rows() * w.cols()) as f64;
        let var = w.data().iter().flatten().map(|x| x * x).sum::<f64>() / n;
        assert!((var - 1.0 / 400.0).abs() < 2e-4, "variance {var}");

        assert_eq!(InitMethod::He.biases(5, &mut rng), Matrix::zeros(5, 1));
    }

    #[test]
    fn zeros_ignore_the_generator() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(InitMethod::Zeros.weights(2, 3, &mut rng), Matrix::zeros(2, 3));
        assert_eq!(InitMethod::Zeros.biases(2, &mut rng), Matrix::zeros(2, 1));
    }
}
