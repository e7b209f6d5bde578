//! 数据加载模块
//!
//! # 主要组件
//!
//! - [`MnistDataset`]: MNIST 手写数字数据集（GAN 的真实样本来源）
//! - [`BatchSampler`]: 按 epoch 打乱的批次采样器
//! - [`download`]: HTTP 下载与 MD5 校验
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use digit_gan::data::{BatchSampler, MnistDataset};
//!
//! let (_validation, train) = MnistDataset::load(None, true, true)?.split_validation(5000)?;
//! let mut sampler = BatchSampler::new(train.len(), Some(42));
//! let real = sampler.next_batch(&train, 64)?; // [64, 1, 28, 28]
//! ```

pub mod datasets;
pub mod download;
mod error;
mod sampler;

#[cfg(test)]
mod tests;

pub use datasets::{MnistDataset, default_data_dir};
pub use error::DataError;
pub use sampler::BatchSampler;
