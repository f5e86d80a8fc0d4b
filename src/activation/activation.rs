use serde::{Deserialize, Serialize};
use std::fmt;

use crate::activation::kernels::{
    ActivationFn, Arctan, Elu, LeakyRelu, Linear, Relu, Sigmoid, Softmax, Softplus, Tanh,
};

/// Activation applied by a layer after its affine transform.
///
/// The enum is the serializable tag; the math lives in the matching
/// [`ActivationFn`] kernel, which a layer resolves once at construction via
/// [`Activation::kernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Sigmoid,
    Tanh,
    Arctan,
    Linear,
    /// Exponential linear unit with α = 0.01.
    Elu,
    Relu,
    /// Leaky ReLU with α = 0.01.
    LeakyRelu,
    Softplus,
    /// Vector-valued; normalizes each column to a probability distribution.
    Softmax,
}

impl Activation {
    pub const ALL: [Activation; 9] = [
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Arctan,
        Activation::Linear,
        Activation::Elu,
        Activation::Relu,
        Activation::LeakyRelu,
        Activation::Softplus,
        Activation::Softmax,
    ];

    pub fn kernel(self) -> &'static dyn ActivationFn {
        match self {
            Activation::Sigmoid => &Sigmoid,
            Activation::Tanh => &Tanh,
            Activation::Arctan => &Arctan,
            Activation::Linear => &Linear,
            Activation::Elu => &Elu,
            Activation::Relu => &Relu,
            Activation::LeakyRelu => &LeakyRelu,
            Activation::Softplus => &Softplus,
            Activation::Softmax => &Softmax,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Arctan => "arctan",
            Activation::Linear => "linear",
            Activation::Elu => "elu",
            Activation::Relu => "relu",
            Activation::LeakyRelu => "leaky_relu",
            Activation::Softplus => "softplus",
            Activation::Softmax => "softmax",
        };
        f.write_str(name)
    }
}
