use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use crate::cost::CostFunction;
use crate::train::epoch_stats::EpochStats;
use crate::train::mode::TrainingMode;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`         — number of `Network::train` calls
/// - `mode`           — online, batch or mini-batch updates
/// - `cost`           — cost function driving the output error
/// - `progress_tx`    — optional channel; one `EpochStats` per completed epoch.
///                      If the receiver is dropped the loop stops early.
/// - `stop_flag`      — optional atomic flag; when set from another thread the
///                      loop stops after the current epoch.
/// - `track_accuracy` — also report classification accuracy each epoch
pub struct TrainConfig {
    pub epochs: usize,
    pub mode: TrainingMode,
    pub cost: CostFunction,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
    pub track_accuracy: bool,
}

impl TrainConfig {
    /// Minimal config: no progress channel, no stop flag, no accuracy.
    pub fn new(epochs: usize, mode: TrainingMode, cost: CostFunction) -> Self {
        TrainConfig {
            epochs,
            mode,
            cost,
            progress_tx: None,
            stop_flag: None,
            track_accuracy: false,
        }
    }
}
