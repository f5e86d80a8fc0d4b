use serde::{Deserialize, Serialize};

/// Per-epoch statistics emitted by `train_loop`.
///
/// When `TrainConfig::progress_tx` is set, the loop sends one value at the
/// end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean absolute cost over the samples processed this epoch.
    pub train_cost: f64,
    /// Mean absolute cost on the validation set, if one was provided.
    pub val_cost: Option<f64>,
    /// Fraction in [0, 1]; only set when `track_accuracy` is on.
    pub train_accuracy: Option<f64>,
    pub val_accuracy: Option<f64>,
    pub elapsed_ms: u64,
}
