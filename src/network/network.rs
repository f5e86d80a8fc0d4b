use log::debug;
use rand::Rng;
use std::fmt;

use crate::activation::Activation;
use crate::cost::{Cost, CostFunction};
use crate::error::{MatrixError, NetworkError, Result};
use crate::layers::dense::Layer;
use crate::layers::init::InitMethod;
use crate::math::matrix::Matrix;
use crate::network::spec::{LayerSpec, NetworkSpec};
use crate::train::mode::TrainingMode;

/// Ordered stack of layers, trained by backpropagation.
///
/// The number of layers is declared up front and filled with
/// [`layer_builder`](Network::layer_builder) or [`push_layer`](Network::push_layer);
/// inference and training refuse to run until every slot is filled and
/// adjacent widths agree.
#[derive(Debug, Clone)]
pub struct Network {
    name: String,
    layers: Vec<Layer>,
    capacity: usize,
    learning_rate: f64,
    lambda: f64,
}

impl Network {
    /// Empty network with `layer_count` slots. `learning_rate` and `lambda`
    /// are the defaults handed to layers that don't override them.
    pub fn new(name: impl Into<String>, layer_count: usize, learning_rate: f64, lambda: f64) -> Network {
        Network {
            name: name.into(),
            layers: Vec::with_capacity(layer_count),
            capacity: layer_count,
            learning_rate,
            lambda,
        }
    }

    /// Builds every layer of `spec` and checks the result for integrity.
    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        let mut network = Network::new(
            spec.name.clone(),
            spec.layers.len(),
            spec.learning_rate,
            spec.lambda,
        );
        for layer in &spec.layers {
            network.push_layer(layer.clone(), rng)?;
        }
        network.check_integrity()?;
        Ok(network)
    }

    /// Wraps already-built layers; used when restoring a snapshot.
    pub(crate) fn from_layers(
        name: String,
        learning_rate: f64,
        lambda: f64,
        layers: Vec<Layer>,
    ) -> Result<Network> {
        let network = Network {
            name,
            capacity: layers.len(),
            layers,
            learning_rate,
            lambda,
        };
        network.check_integrity()?;
        Ok(network)
    }

    /// Appends a layer using the network's default learning rate and λ.
    pub fn layer_builder<R: Rng + ?Sized>(
        &mut self,
        inputs: usize,
        neurons: usize,
        activation: Activation,
        init: InitMethod,
        rng: &mut R,
    ) -> Result<()> {
        self.push_layer(LayerSpec::new(inputs, neurons, activation, init), rng)
    }

    /// Appends a layer built from `spec`; unset overrides fall back to the
    /// network defaults.
    pub fn push_layer<R: Rng + ?Sized>(&mut self, spec: LayerSpec, rng: &mut R) -> Result<()> {
        if self.layers.len() >= self.capacity {
            return Err(NetworkError::LayerBounds {
                capacity: self.capacity,
            });
        }
        let spec = LayerSpec {
            learning_rate: Some(spec.learning_rate.unwrap_or(self.learning_rate)),
            lambda: Some(spec.lambda.unwrap_or(self.lambda)),
            ..spec
        };
        self.layers.push(Layer::new(&spec, rng)?);
        Ok(())
    }

    /// Fails on the first pair of adjacent layers whose widths disagree.
    pub fn check_integrity(&self) -> Result<()> {
        for (i, pair) in self.layers.windows(2).enumerate() {
            let (outputs, next_inputs) = (pair[0].num_outputs(), pair[1].num_inputs());
            if outputs != next_inputs {
                return Err(NetworkError::Integrity {
                    layer: i,
                    outputs,
                    next_inputs,
                });
            }
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.capacity > 0 && self.layers.len() == self.capacity
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.is_complete() {
            return Err(NetworkError::Incomplete {
                built: self.layers.len(),
                capacity: self.capacity,
            });
        }
        self.check_integrity()
    }

    fn output_layer(&self) -> Result<&Layer> {
        self.layers.last().ok_or(NetworkError::Incomplete {
            built: 0,
            capacity: self.capacity,
        })
    }

    /// Forward pass; stores activations in each layer for backprop.
    /// The caller's input is copied, never aliased.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        self.ensure_ready()?;
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Inference on a plain slice.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.forward(&Matrix::column_vector(input))?.to_column_vec())
    }

    /// Runs `input` forward and scores the guess against `target`.
    pub fn evaluate(&mut self, input: &Matrix, target: &Matrix, cost: CostFunction) -> Result<f64> {
        let guess = self.forward(input)?;
        Ok(cost.kernel().evaluate(&guess, target)?)
    }

    /// Mean absolute cost over a labelled set.
    pub fn evaluate_set(&mut self, inputs: &[Matrix], targets: &[Matrix], cost: CostFunction) -> Result<f64> {
        self.validate_set(inputs, targets)?;
        let mut total = 0.0;
        for (input, target) in inputs.iter().zip(targets) {
            total += self.evaluate(input, target, cost)?.abs();
        }
        Ok(total / inputs.len() as f64)
    }

    /// Pushes the output-layer `error` back through every layer, then adds
    /// each layer's delta for this sample. `input` is the sample that
    /// produced the last forward pass.
    pub fn backpropagate(&mut self, error: &Matrix, input: &Matrix) -> Result<()> {
        self.ensure_ready()?;
        let last = self.layers.len() - 1;
        self.layers[last].set_errors(error)?;

        for i in (1..=last).rev() {
            let gradient = self.layers[i].error_gradient()?;
            let errors = self.layers[i - 1].activation_backward(&gradient)?;
            self.layers[i - 1].set_errors(&errors)?;
        }

        self.layers[0].accumulate_delta(input)?;
        for i in 1..self.layers.len() {
            let (upstream, rest) = self.layers.split_at_mut(i);
            rest[0].accumulate_delta(upstream[i - 1].outputs())?;
        }
        Ok(())
    }

    /// Applies and clears the pending deltas of every layer.
    pub fn apply_gradient_descent(&mut self) -> Result<()> {
        for layer in &mut self.layers {
            layer.apply_gradient_descent()?;
        }
        Ok(())
    }

    /// Runs one training pass over `samples` and returns the mean absolute
    /// cost of the samples processed.
    ///
    /// Every sample and target is shape-checked before any weight changes.
    /// `rng` is only drawn from in [`TrainingMode::MiniBatch`].
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        samples: &[Matrix],
        targets: &[Matrix],
        cost: CostFunction,
        mode: TrainingMode,
        rng: &mut R,
    ) -> Result<f64> {
        self.ensure_ready()?;
        self.validate_set(samples, targets)?;
        let kernel = cost.kernel();

        let mean_cost = match mode {
            TrainingMode::Online => self.train_online(samples, targets, kernel)?,
            TrainingMode::Batch => {
                let indices: Vec<usize> = (0..samples.len()).collect();
                self.train_batch(samples, targets, &indices, kernel)? / samples.len() as f64
            }
            TrainingMode::MiniBatch { size } => {
                self.train_mini_batch(samples, targets, size, kernel, rng)?
            }
        };

        debug!(
            "{}: {:?} pass over {} samples, cost {:.6}",
            self.name,
            mode,
            samples.len(),
            mean_cost
        );
        Ok(mean_cost)
    }

    fn train_online(&mut self, samples: &[Matrix], targets: &[Matrix], cost: &dyn Cost) -> Result<f64> {
        let mut total = 0.0;
        for (input, target) in samples.iter().zip(targets) {
            total += self.train_sample(input, target, cost)?;
            self.apply_gradient_descent()?;
        }
        Ok(total / samples.len() as f64)
    }

    /// Accumulates every indexed sample and applies one step; returns the
    /// summed cost.
    fn train_batch(
        &mut self,
        samples: &[Matrix],
        targets: &[Matrix],
        indices: &[usize],
        cost: &dyn Cost,
    ) -> Result<f64> {
        let mut total = 0.0;
        for &i in indices {
            total += self.train_sample(&samples[i], &targets[i], cost)?;
        }
        self.apply_gradient_descent()?;
        Ok(total)
    }

    fn train_mini_batch<R: Rng + ?Sized>(
        &mut self,
        samples: &[Matrix],
        targets: &[Matrix],
        size: usize,
        cost: &dyn Cost,
        rng: &mut R,
    ) -> Result<f64> {
        if size == 0 {
            return Err(NetworkError::InvalidMiniBatch { size });
        }
        let n = samples.len();
        let iterations = (n / size).max(1);

        let mut total = 0.0;
        for _ in 0..iterations {
            let indices: Vec<usize> = (0..size).map(|_| rng.gen_range(0..n)).collect();
            total += self.train_batch(samples, targets, &indices, cost)?;
        }
        Ok(total / (iterations * size) as f64)
    }

    /// Forward, cost, output error and backprop for one sample; returns
    /// the absolute cost.
    fn train_sample(&mut self, input: &Matrix, target: &Matrix, cost: &dyn Cost) -> Result<f64> {
        let guess = self.forward(input)?;
        let value = cost.evaluate(&guess, target)?;
        let error = cost.output_error(&guess, target, self.output_layer()?)?;
        self.backpropagate(&error, input)?;
        Ok(value.abs())
    }

    /// Checks that `inputs` and `targets` pair up one-to-one and that every
    /// column matches the network's input and output widths.
    pub(crate) fn validate_set(&self, inputs: &[Matrix], targets: &[Matrix]) -> Result<()> {
        if inputs.len() != targets.len() {
            return Err(NetworkError::SampleCountMismatch {
                samples: inputs.len(),
                targets: targets.len(),
            });
        }
        if inputs.is_empty() {
            return Err(NetworkError::EmptyTrainingSet);
        }

        let input_shape = (self.input_width().unwrap_or(0), 1);
        let output_shape = (self.output_width().unwrap_or(0), 1);
        for (input, target) in inputs.iter().zip(targets) {
            if input.shape() != input_shape {
                return Err(MatrixError::Dimension {
                    op: "input",
                    left: input_shape,
                    right: input.shape(),
                }
                .into());
            }
            if target.shape() != output_shape {
                return Err(MatrixError::Dimension {
                    op: "target",
                    left: output_shape,
                    right: target.shape(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Number of declared layer slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn input_width(&self) -> Option<usize> {
        self.layers.first().map(Layer::num_inputs)
    }

    pub fn output_width(&self) -> Option<usize> {
        self.layers.last().map(Layer::num_outputs)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Sets the default rate and pushes it to every built layer.
    pub fn set_learning_rate(&mut self, rate: f64) {
        self.learning_rate = rate;
        self.layers.iter_mut().for_each(|l| l.set_learning_rate(rate));
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Sets the default λ and pushes it to every built layer.
    pub fn set_lambda(&mut self, lambda: f64) {
        self.lambda = lambda;
        self.layers.iter_mut().for_each(|l| l.set_lambda(lambda));
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network {}", self.name)?;
        writeln!(
            f,
            "inputs: {}, hidden layers: {}, outputs: {}",
            self.input_width().unwrap_or(0),
            self.layers.len().saturating_sub(1),
            self.output_width().unwrap_or(0)
        )?;
        writeln!(f, "learning rate: {}, lambda: {}", self.learning_rate, self.lambda)?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(
                f,
                "layer {i}: {} -> {} ({}, {:?} init)",
                layer.num_inputs(),
                layer.num_outputs(),
                layer.activation(),
                layer.init()
            )?;
        }
        Ok(())
    }
}
