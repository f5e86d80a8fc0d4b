pub mod linalg;
pub mod matrix;

pub use linalg::{Eigen, Qr};
pub use matrix::Matrix;
