use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, info};
use rand::Rng;

use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Trains `network` for `config.epochs` epochs and returns the mean training
/// cost of the last completed epoch (0.0 if none completed).
///
/// # Arguments
/// - `network`    — modified in place
/// - `inputs`     — training samples, each an `input_width × 1` column
/// - `targets`    — matching targets, each an `output_width × 1` column
/// - `validation` — optional `(inputs, targets)` scored after every epoch
/// - `config`     — mode, cost, optional progress channel and stop flag
/// - `rng`        — drawn from by mini-batch sampling only
///
/// # Early termination
/// The loop breaks early if the `progress_tx` receiver has been dropped or
/// `config.stop_flag` is set.
pub fn train_loop<R: Rng + ?Sized>(
    network: &mut Network,
    inputs: &[Matrix],
    targets: &[Matrix],
    validation: Option<(&[Matrix], &[Matrix])>,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<f64> {
    let mut last_cost = 0.0;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }
        let t_start = Instant::now();

        last_cost = network.train(inputs, targets, config.cost, config.mode, rng)?;

        let train_accuracy = if config.track_accuracy {
            Some(classification_accuracy(network, inputs, targets)?)
        } else {
            None
        };

        let (val_cost, val_accuracy) = match validation {
            Some((vi, vt)) => {
                let cost = network.evaluate_set(vi, vt, config.cost)?;
                let accuracy = if config.track_accuracy {
                    Some(classification_accuracy(network, vi, vt)?)
                } else {
                    None
                };
                (Some(cost), accuracy)
            }
            None => (None, None),
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_cost: last_cost,
            val_cost,
            train_accuracy,
            val_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        debug!("{}: {:?}", network.name(), stats);

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                debug!("{}: progress receiver dropped, stopping", network.name());
                break;
            }
        }
    }

    info!("{}: training finished, cost {:.6}", network.name(), last_cost);
    Ok(last_cost)
}

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Fraction of samples classified correctly.
///
/// Multi-output networks compare argmax of output and target; a single
/// output neuron is thresholded at 0.5. The set is shape-checked like a
/// training set before anything runs.
pub fn classification_accuracy(
    network: &mut Network,
    inputs: &[Matrix],
    targets: &[Matrix],
) -> Result<f64> {
    network.validate_set(inputs, targets)?;
    let mut correct = 0usize;
    for (input, target) in inputs.iter().zip(targets) {
        let output = network.forward(input)?.to_column_vec();
        let target = target.to_column_vec();
        let hit = if output.len() == 1 {
            (output[0] >= 0.5) == (target[0] >= 0.5)
        } else {
            argmax(&output) == argmax(&target)
        };
        if hit {
            correct += 1;
        }
    }
    Ok(correct as f64 / inputs.len() as f64)
}

/// Index of the largest element; 0 for an empty slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
