use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::activation::Activation;
use crate::error::Result;
use crate::layers::init::InitMethod;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `inputs`        — width of the vector feeding this layer (the previous
///                     layer's neuron count, or the raw input width)
/// - `neurons`       — number of neurons, i.e. this layer's output width
/// - `activation`    — activation applied after the affine transform
/// - `init`          — weight/bias initialization policy
/// - `learning_rate` — per-layer override of the network default
/// - `lambda`        — per-layer override of the network's L2 coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub inputs: usize,
    pub neurons: usize,
    pub activation: Activation,
    pub init: InitMethod,
    #[serde(default)]
    pub learning_rate: Option<f64>,
    #[serde(default)]
    pub lambda: Option<f64>,
}

impl LayerSpec {
    pub fn new(inputs: usize, neurons: usize, activation: Activation, init: InitMethod) -> Self {
        LayerSpec {
            inputs,
            neurons,
            activation,
            init,
            learning_rate: None,
            lambda: None,
        }
    }

    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = Some(lambda);
        self
    }
}

/// A serializable description of a network architecture and its default
/// hyper-parameters.
///
/// Layers without their own `learning_rate`/`lambda` inherit the defaults
/// given here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, also used as the file stem when persisting.
    pub name: String,
    pub learning_rate: f64,
    #[serde(default)]
    pub lambda: f64,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    pub fn new(name: impl Into<String>, learning_rate: f64, lambda: f64) -> Self {
        NetworkSpec {
            name: name.into(),
            learning_rate,
            lambda,
            layers: Vec::new(),
        }
    }

    pub fn layer(mut self, spec: LayerSpec) -> Self {
        self.layers.push(spec);
        self
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_optional_in_json() {
        let json = r#"{
            "name": "and",
            "learning_rate": 0.5,
            "layers": [
                { "inputs": 2, "neurons": 1, "activation": "sigmoid", "init": "gaussian" }
            ]
        }"#;
        let spec: NetworkSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.lambda, 0.0);
        assert_eq!(
            spec.layers[0],
            LayerSpec::new(2, 1, Activation::Sigmoid, InitMethod::Gaussian)
        );
    }

    #[test]
    fn spec_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");

        let spec = NetworkSpec::new("xor", 0.3, 0.001)
            .layer(LayerSpec::new(2, 3, Activation::Tanh, InitMethod::Xavier).with_lambda(0.0))
            .layer(LayerSpec::new(3, 1, Activation::Sigmoid, InitMethod::Random));
        spec.save_json(&path).unwrap();
        assert_eq!(NetworkSpec::load_json(&path).unwrap(), spec);
    }

    #[test]
    fn load_reports_io_and_parse_failures_as_network_errors() {
        use crate::error::NetworkError;

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(NetworkSpec::load_json(&missing), Err(NetworkError::Io(_))));

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, "{ \"name\": ").unwrap();
        assert!(matches!(
            NetworkSpec::load_json(&garbled),
            Err(NetworkError::Serialization(_))
        ));
    }
}
