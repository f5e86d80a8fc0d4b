//! Dense linear algebra and a small feed-forward network trainer built on it.

pub mod activation;
pub mod cost;
pub mod error;
pub mod layers;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::Activation;
pub use cost::CostFunction;
pub use error::{MatrixError, NetworkError, Result};
pub use layers::{InitMethod, Layer};
pub use math::{Eigen, Matrix, Qr};
pub use network::{LayerSpec, Network, NetworkSnapshot, NetworkSpec};
pub use train::{train_loop, EpochStats, TrainConfig, TrainingMode};
