pub mod activation;
pub mod kernels;

pub use activation::Activation;
pub use kernels::ActivationFn;
