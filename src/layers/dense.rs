use rand::Rng;

use crate::activation::{Activation, ActivationFn};
use crate::error::{MatrixError, NetworkError};
use crate::layers::init::InitMethod;
use crate::math::matrix::Matrix;
use crate::network::spec::LayerSpec;

pub const DEFAULT_LEARNING_RATE: f64 = 0.05;

/// Fully connected layer: `a = f(W·x + b)`.
///
/// Besides its parameters the layer keeps the state of the last pass
/// (`z`, `a`, error vector) and the gradient-descent accumulators. The
/// network drives the passes in order: `forward`, `set_errors`,
/// `accumulate_delta`, then `apply_gradient_descent` once per batch.
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Matrix,
    biases: Matrix,
    delta_weights: Matrix,
    delta_biases: Matrix,
    pre_activation: Matrix,
    outputs: Matrix,
    errors: Matrix,
    activation: Activation,
    kernel: &'static dyn ActivationFn,
    init: InitMethod,
    learning_rate: f64,
    lambda: f64,
    batch_count: usize,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(spec: &LayerSpec, rng: &mut R) -> Result<Layer, NetworkError> {
        check_widths(spec)?;
        let weights = spec.init.weights(spec.neurons, spec.inputs, rng);
        let biases = spec.init.biases(spec.neurons, rng);
        Ok(Layer::assemble(spec, weights, biases))
    }

    /// Rebuilds a layer around existing parameters, e.g. from a snapshot.
    pub fn from_parts(spec: &LayerSpec, weights: Matrix, biases: Matrix) -> Result<Layer, NetworkError> {
        check_widths(spec)?;
        let expected = [(spec.neurons, spec.inputs), (spec.neurons, 1)];
        for (found, expected) in [weights.shape(), biases.shape()].into_iter().zip(expected) {
            if found != expected {
                return Err(MatrixError::Dimension {
                    op: "from_parts",
                    left: expected,
                    right: found,
                }
                .into());
            }
        }
        Ok(Layer::assemble(spec, weights, biases))
    }

    fn assemble(spec: &LayerSpec, weights: Matrix, biases: Matrix) -> Layer {
        let (inputs, neurons) = (spec.inputs, spec.neurons);
        Layer {
            weights,
            biases,
            delta_weights: Matrix::zeros(neurons, inputs),
            delta_biases: Matrix::zeros(neurons, 1),
            pre_activation: Matrix::zeros(neurons, 1),
            outputs: Matrix::zeros(neurons, 1),
            errors: Matrix::zeros(neurons, 1),
            activation: spec.activation,
            kernel: spec.activation.kernel(),
            init: spec.init,
            learning_rate: spec.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE),
            lambda: spec.lambda.unwrap_or(0.0),
            batch_count: 0,
        }
    }

    /// Forward pass; stores `z` and `a` for backprop and returns a copy of `a`.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix, MatrixError> {
        let z = self.weights.matmul(input)?.add(&self.biases)?;
        let a = self.kernel.forward(&z);
        self.pre_activation = z;
        self.outputs = a.clone();
        Ok(a)
    }

    /// Stores the error vector (∂C/∂z) for this layer's neurons.
    pub fn set_errors(&mut self, errors: &Matrix) -> Result<(), MatrixError> {
        if errors.shape() != self.errors.shape() {
            return Err(MatrixError::Dimension {
                op: "set_errors",
                left: self.errors.shape(),
                right: errors.shape(),
            });
        }
        self.errors = errors.clone();
        Ok(())
    }

    /// `Wᵀ·e`, the gradient the previous layer needs for its own error.
    pub fn error_gradient(&self) -> Result<Matrix, MatrixError> {
        self.weights.transpose().matmul(&self.errors)
    }

    /// Pulls `grad` (∂C/∂a) back through this layer's activation using the
    /// `z` and `a` of the last forward pass.
    pub fn activation_backward(&self, grad: &Matrix) -> Result<Matrix, MatrixError> {
        self.kernel.backward(&self.pre_activation, &self.outputs, grad)
    }

    /// Element-wise activation derivative for the last forward pass.
    pub fn activation_derivatives(&self) -> Matrix {
        self.kernel.derivative(&self.pre_activation, &self.outputs)
    }

    /// Adds this sample's contribution to the pending deltas.
    ///
    /// `input` must be the activation vector that fed this layer.
    pub fn accumulate_delta(&mut self, input: &Matrix) -> Result<(), MatrixError> {
        let gradient = self.errors.scale(self.learning_rate);
        let delta_biases = self.delta_biases.add(&gradient)?;
        let delta_weights = self
            .delta_weights
            .add(&gradient.matmul(&input.transpose())?)?;

        self.delta_biases = delta_biases;
        self.delta_weights = delta_weights;
        self.batch_count += 1;
        Ok(())
    }

    /// Applies the averaged deltas plus L2 weight decay, then clears the
    /// accumulators. A no-op when nothing has been accumulated.
    pub fn apply_gradient_descent(&mut self) -> Result<(), MatrixError> {
        if self.batch_count == 0 {
            return Ok(());
        }

        let inv_count = 1.0 / self.batch_count as f64;
        let regularization = self.weights.scale(self.lambda * self.learning_rate * inv_count);
        let weights = self
            .weights
            .sub(&self.delta_weights.scale(inv_count))?
            .sub(&regularization)?;
        let biases = self.biases.sub(&self.delta_biases.scale(inv_count))?;

        self.weights = weights;
        self.biases = biases;
        self.delta_weights.fill(0.0);
        self.delta_biases.fill(0.0);
        self.batch_count = 0;
        Ok(())
    }

    pub fn num_inputs(&self) -> usize {
        self.weights.cols()
    }

    pub fn num_outputs(&self) -> usize {
        self.weights.rows()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn init(&self) -> InitMethod {
        self.init
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    /// Activation output of the last forward pass.
    pub fn outputs(&self) -> &Matrix {
        &self.outputs
    }

    pub fn pre_activation(&self) -> &Matrix {
        &self.pre_activation
    }

    pub fn errors(&self) -> &Matrix {
        &self.errors
    }

    /// Samples accumulated since the last gradient-descent step.
    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, rate: f64) {
        self.learning_rate = rate;
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn set_lambda(&mut self, lambda: f64) {
        self.lambda = lambda;
    }

    /// Replaces the weight matrix; the shape must stay `neurons × inputs`.
    pub fn set_weights(&mut self, weights: Matrix) -> Result<(), MatrixError> {
        if weights.shape() != self.weights.shape() {
            return Err(MatrixError::Dimension {
                op: "set_weights",
                left: self.weights.shape(),
                right: weights.shape(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    /// Replaces the bias vector; the shape must stay `neurons × 1`.
    pub fn set_biases(&mut self, biases: Matrix) -> Result<(), MatrixError> {
        if biases.shape() != self.biases.shape() {
            return Err(MatrixError::Dimension {
                op: "set_biases",
                left: self.biases.shape(),
                right: biases.shape(),
            });
        }
        self.biases = biases;
        Ok(())
    }
}

fn check_widths(spec: &LayerSpec) -> Result<(), NetworkError> {
    if spec.inputs == 0 || spec.neurons == 0 {
        return Err(NetworkError::InvalidLayer {
            inputs: spec.inputs,
            neurons: spec.neurons,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn linear_layer(inputs: usize, neurons: usize) -> Layer {
        let spec = LayerSpec::new(inputs, neurons, Activation::Linear, InitMethod::Zeros)
            .with_learning_rate(0.5);
        Layer::new(&spec, &mut StdRng::seed_from_u64(0)).unwrap()
    }

    fn m(data: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_data(data).unwrap()
    }

    #[test]
    fn rejects_zero_width() {
        let spec = LayerSpec::new(0, 3, Activation::Relu, InitMethod::Random);
        assert!(matches!(
            Layer::new(&spec, &mut StdRng::seed_from_u64(0)),
            Err(NetworkError::InvalidLayer { inputs: 0, neurons: 3 })
        ));
    }

    #[test]
    fn from_parts_checks_parameter_shapes() {
        let spec = LayerSpec::new(2, 1, Activation::Tanh, InitMethod::He);
        let layer = Layer::from_parts(&spec, m(vec![vec![1.0, 2.0]]), Matrix::column_vector(&[0.5])).unwrap();
        assert_eq!(layer.init(), InitMethod::He);
        assert_eq!(layer.num_inputs(), 2);

        let err = Layer::from_parts(&spec, m(vec![vec![1.0]]), Matrix::column_vector(&[0.5]));
        assert!(matches!(
            err,
            Err(NetworkError::Matrix(MatrixError::Dimension { op: "from_parts", .. }))
        ));
    }

    #[test]
    fn forward_computes_affine_then_activation() {
        let mut layer = linear_layer(2, 2);
        layer.set_weights(m(vec![vec![1.0, 2.0], vec![-1.0, 0.5]])).unwrap();
        layer.set_biases(Matrix::column_vector(&[0.5, 1.0])).unwrap();

        let out = layer.forward(&Matrix::column_vector(&[2.0, 4.0])).unwrap();
        assert_eq!(out.to_column_vec(), vec![10.5, 1.0]);
        assert_eq!(layer.pre_activation(), &out);
        assert_eq!(layer.outputs(), &out);
    }

    #[test]
    fn forward_rejects_wrong_input_width_without_mutation() {
        let mut layer = linear_layer(2, 1);
        layer.forward(&Matrix::column_vector(&[1.0, 1.0])).unwrap();
        let before = layer.outputs().clone();
        assert!(layer.forward(&Matrix::column_vector(&[1.0, 2.0, 3.0])).is_err());
        assert_eq!(layer.outputs(), &before);
    }

    #[test]
    fn error_gradient_is_transposed_weights_times_errors() {
        let mut layer = linear_layer(3, 2);
        layer
            .set_weights(m(vec![vec![1.0, 0.0, 2.0], vec![0.0, 3.0, -1.0]]))
            .unwrap();
        layer.set_errors(&Matrix::column_vector(&[1.0, 2.0])).unwrap();
        assert_eq!(layer.error_gradient().unwrap().to_column_vec(), vec![1.0, 6.0, 0.0]);
        assert!(layer.set_errors(&Matrix::column_vector(&[1.0])).is_err());
    }

    #[test]
    fn gradient_descent_averages_accumulated_deltas() {
        let mut layer = linear_layer(2, 1);
        let input = Matrix::column_vector(&[1.0, 2.0]);

        layer.set_errors(&Matrix::column_vector(&[1.0])).unwrap();
        layer.accumulate_delta(&input).unwrap();
        layer.set_errors(&Matrix::column_vector(&[3.0])).unwrap();
        layer.accumulate_delta(&input).unwrap();
        assert_eq!(layer.batch_count(), 2);

        layer.apply_gradient_descent().unwrap();
        // Mean error 2.0, learning rate 0.5: ΔW = [1, 2], Δb = [1].
        assert_eq!(layer.weights(), &m(vec![vec![-1.0, -2.0]]));
        assert_eq!(layer.biases().to_column_vec(), vec![-1.0]);
        assert_eq!(layer.batch_count(), 0);

        // Accumulators were cleared: a second step changes nothing.
        layer.apply_gradient_descent().unwrap();
        assert_eq!(layer.weights(), &m(vec![vec![-1.0, -2.0]]));
    }

    #[test]
    fn l2_term_decays_weights() {
        let mut layer = linear_layer(1, 1);
        layer.set_lambda(0.1);
        layer.set_weights(m(vec![vec![2.0]])).unwrap();
        layer.set_errors(&Matrix::column_vector(&[0.0])).unwrap();
        layer.accumulate_delta(&Matrix::column_vector(&[1.0])).unwrap();
        layer.apply_gradient_descent().unwrap();
        // W -= λ·lr·W = 2 - 0.1·0.5·2
        assert!((layer.weights().get(0, 0).unwrap() - 1.9).abs() < 1e-12);
    }

    #[test]
    fn activation_derivatives_use_sigmoid_output() {
        let spec = LayerSpec::new(1, 1, Activation::Sigmoid, InitMethod::Zeros);
        let mut layer = Layer::new(&spec, &mut StdRng::seed_from_u64(0)).unwrap();
        layer.forward(&Matrix::column_vector(&[1.0])).unwrap();
        assert_eq!(layer.activation_derivatives().to_column_vec(), vec![0.25]);
        assert_eq!(layer.learning_rate(), DEFAULT_LEARNING_RATE);
    }
}
