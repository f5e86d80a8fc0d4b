use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::activation::Activation;
use crate::error::Result;
use crate::layers::dense::Layer;
use crate::layers::init::InitMethod;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::network::spec::LayerSpec;

/// Trained parameters of one layer, in plain nested vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub inputs: usize,
    pub neurons: usize,
    pub activation: Activation,
    pub init: InitMethod,
    pub learning_rate: f64,
    pub lambda: f64,
    /// `neurons` rows of `inputs` weights each.
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

/// Serializable form of a [`Network`]: architecture, hyper-parameters and
/// weights. Per-pass state and pending deltas are not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub name: String,
    pub learning_rate: f64,
    pub lambda: f64,
    pub layers: Vec<LayerSnapshot>,
}

impl From<&Layer> for LayerSnapshot {
    fn from(layer: &Layer) -> Self {
        LayerSnapshot {
            inputs: layer.num_inputs(),
            neurons: layer.num_outputs(),
            activation: layer.activation(),
            init: layer.init(),
            learning_rate: layer.learning_rate(),
            lambda: layer.lambda(),
            weights: layer.weights().data().to_vec(),
            biases: layer.biases().to_column_vec(),
        }
    }
}

impl LayerSnapshot {
    fn restore(&self) -> Result<Layer> {
        let spec = LayerSpec::new(self.inputs, self.neurons, self.activation, self.init)
            .with_learning_rate(self.learning_rate)
            .with_lambda(self.lambda);
        let weights = Matrix::from_data(self.weights.clone())?;
        let biases = Matrix::from_data(self.biases.iter().map(|&b| vec![b]).collect())?;
        Layer::from_parts(&spec, weights, biases)
    }
}

impl Network {
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            name: self.name().to_string(),
            learning_rate: self.learning_rate(),
            lambda: self.lambda(),
            layers: self.layers().iter().map(LayerSnapshot::from).collect(),
        }
    }

    /// Rebuilds a network from a snapshot. Fails if any layer's parameters
    /// don't match its declared shape or adjacent layers disagree.
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Result<Network> {
        let layers = snapshot
            .layers
            .iter()
            .map(LayerSnapshot::restore)
            .collect::<Result<Vec<_>>>()?;
        Network::from_layers(
            snapshot.name.clone(),
            snapshot.learning_rate,
            snapshot.lambda,
            layers,
        )
    }

    /// Writes the network's snapshot as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.snapshot())?;
        Ok(())
    }

    /// Restores a network previously written by [`save_json`](Network::save_json).
    pub fn load_json(path: impl AsRef<Path>) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let snapshot: NetworkSnapshot = serde_json::from_reader(reader)?;
        Network::from_snapshot(&snapshot)
    }
}
