//! 内置数据集

pub(crate) mod mnist;

pub use mnist::{MnistDataset, default_data_dir};
