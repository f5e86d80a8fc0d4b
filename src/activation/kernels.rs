//! Forward and derivative kernels, one unit struct per [`Activation`].
//!
//! Derivatives are evaluated on the pre-activation `z` except for sigmoid,
//! which reuses its own output `a`.
//!
//! [`Activation`]: crate::activation::Activation

use std::fmt;

use crate::error::MatrixError;
use crate::math::matrix::Matrix;

pub const ELU_ALPHA: f64 = 0.01;
pub const LEAKY_RELU_ALPHA: f64 = 0.01;

pub trait ActivationFn: fmt::Debug + Send + Sync {
    /// Maps the pre-activation `z` to the activation `a`.
    fn forward(&self, z: &Matrix) -> Matrix;

    /// Element-wise derivative `f'` for the stored `z` and `a`.
    fn derivative(&self, z: &Matrix, a: &Matrix) -> Matrix;

    /// Pulls `grad` (∂C/∂a) back through the activation, giving ∂C/∂z.
    fn backward(&self, z: &Matrix, a: &Matrix, grad: &Matrix) -> Result<Matrix, MatrixError> {
        grad.hadamard(&self.derivative(z, a))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn tanh(x: f64) -> f64 {
    2.0 / (1.0 + (-2.0 * x).exp()) - 1.0
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl ActivationFn for Sigmoid {
    fn forward(&self, z: &Matrix) -> Matrix {
        z.map(sigmoid)
    }

    fn derivative(&self, _z: &Matrix, a: &Matrix) -> Matrix {
        a.map(|a| a * (1.0 - a))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tanh;

impl ActivationFn for Tanh {
    fn forward(&self, z: &Matrix) -> Matrix {
        z.map(tanh)
    }

    fn derivative(&self, z: &Matrix, _a: &Matrix) -> Matrix {
        z.map(|x| {
            let t = tanh(x);
            1.0 - t * t
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Arctan;

impl ActivationFn for Arctan {
    fn forward(&self, z: &Matrix) -> Matrix {
        z.map(f64::atan)
    }

    fn derivative(&self, z: &Matrix, _a: &Matrix) -> Matrix {
        z.map(|x| 1.0 / (1.0 + x * x))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl ActivationFn for Linear {
    fn forward(&self, z: &Matrix) -> Matrix {
        z.clone()
    }

    fn derivative(&self, z: &Matrix, _a: &Matrix) -> Matrix {
        z.map(|_| 1.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Elu;

impl ActivationFn for Elu {
    fn forward(&self, z: &Matrix) -> Matrix {
        z.map(|x| if x >= 0.0 { x } else { ELU_ALPHA * (x.exp() - 1.0) })
    }

    /// `e^x − 1 + α` below zero, kept as-is for compatibility with trained
    /// models rather than the textbook `α·e^x`.
    fn derivative(&self, z: &Matrix, _a: &Matrix) -> Matrix {
        z.map(|x| if x >= 0.0 { 1.0 } else { x.exp() - 1.0 + ELU_ALPHA })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Relu;

impl ActivationFn for Relu {
    fn forward(&self, z: &Matrix) -> Matrix {
        z.map(|x| if x >= 0.0 { x } else { 0.0 })
    }

    fn derivative(&self, z: &Matrix, _a: &Matrix) -> Matrix {
        z.map(|x| if x >= 0.0 { 1.0 } else { 0.0 })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeakyRelu;

impl ActivationFn for LeakyRelu {
    fn forward(&self, z: &Matrix) -> Matrix {
        z.map(|x| if x >= 0.0 { x } else { LEAKY_RELU_ALPHA * x })
    }

    fn derivative(&self, z: &Matrix, _a: &Matrix) -> Matrix {
        z.map(|x| if x >= 0.0 { 1.0 } else { LEAKY_RELU_ALPHA })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Softplus;

impl ActivationFn for Softplus {
    fn forward(&self, z: &Matrix) -> Matrix {
        z.map(|x| x.exp().ln_1p())
    }

    fn derivative(&self, z: &Matrix, _a: &Matrix) -> Matrix {
        z.map(sigmoid)
    }
}

/// Column-wise softmax.
///
/// `derivative` returns the Jacobian diagonal `s·(1 − s)`; `backward` applies
/// the full Jacobian, `δ = s ⊙ (g − sᵀg)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Softmax;

impl ActivationFn for Softmax {
    fn forward(&self, z: &Matrix) -> Matrix {
        let mut res = z.clone();
        for col in 0..z.cols {
            // Shifting by the max leaves the result unchanged and keeps exp finite.
            let max = z.data.iter().map(|r| r[col]).fold(f64::NEG_INFINITY, f64::max);
            let sum: f64 = z.data.iter().map(|r| (r[col] - max).exp()).sum();
            for (out, row) in res.data.iter_mut().zip(z.data.iter()) {
                out[col] = (row[col] - max).exp() / sum;
            }
        }
        res
    }

    fn derivative(&self, _z: &Matrix, a: &Matrix) -> Matrix {
        a.map(|s| s * (1.0 - s))
    }

    fn backward(&self, _z: &Matrix, a: &Matrix, grad: &Matrix) -> Result<Matrix, MatrixError> {
        let weighted = a.hadamard(grad)?;
        let mut res = weighted.clone();
        for col in 0..a.cols {
            let dot: f64 = weighted.data.iter().map(|r| r[col]).sum();
            for (out, s) in res.data.iter_mut().zip(a.data.iter()) {
                out[col] -= s[col] * dot;
            }
        }
        Ok(res)
    }
}
