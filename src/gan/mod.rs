//! MNIST 手写数字 GAN：网络结构、训练循环与检查点
//!
//! ```ignore
//! let config = GanConfig::load_or_default(DEFAULT_CONFIG_FILE)?;
//! let (validation, train) = MnistDataset::load(None, true, true)?.split_validation(5000)?;
//! let mut trainer = GanTrainer::new(config)?;
//! trainer.train(&train, Some(&validation))?;
//! ```

mod checkpoint;
mod config;
mod error;
mod model;
mod sample;
mod trainer;

#[cfg(test)]
mod tests;

pub use checkpoint::{Checkpoint, TrainingState};
pub use config::{DEFAULT_CONFIG_FILE, GanConfig};
pub use error::GanError;
pub use model::{Discriminator, Generator};
pub use sample::{SAMPLE_GRID_COLUMNS, sample_grid, save_sample_grid};
pub use trainer::{GanTrainer, IterationReport, update_decision};
