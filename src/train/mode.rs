use serde::{Deserialize, Serialize};

/// When accumulated gradients are applied during one training call.
///
/// - `Online`    — after every sample.
/// - `Batch`     — once, after the whole training set.
/// - `MiniBatch` — once per group of `size` samples drawn uniformly with
///   replacement; `max(1, n / size)` groups are drawn per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrainingMode {
    Online,
    Batch,
    MiniBatch { size: usize },
}
