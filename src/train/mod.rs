pub mod epoch_stats;
pub mod loop_fn;
pub mod mode;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use loop_fn::{classification_accuracy, train_loop};
pub use mode::TrainingMode;
pub use train_config::TrainConfig;
