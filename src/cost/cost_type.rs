use serde::{Deserialize, Serialize};

use crate::cost::{Cost, CrossEntropyCost, QuadraticCost};

/// Selects which cost function training uses.
///
/// - `Quadratic`    — sum of squared errors; pair with any output activation.
/// - `CrossEntropy` — binary cross-entropy averaged over output neurons; pair
///   with a Sigmoid or Softmax output. The output error skips the activation
///   derivative since it cancels for those activations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    Quadratic,
    CrossEntropy,
}

impl CostFunction {
    pub fn kernel(self) -> &'static dyn Cost {
        match self {
            CostFunction::Quadratic => &QuadraticCost,
            CostFunction::CrossEntropy => &CrossEntropyCost,
        }
    }
}
