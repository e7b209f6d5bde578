//! # Digit GAN
//!
//! 用纯 rust 训练一个生成 MNIST 手写数字的生成对抗网络（GAN）。
//!
//! - [`tensor`]: 基于`ndarray`的 f32 张量
//! - [`nn`]: 静态计算图、反向传播、常用层与 RMSProp 优化器
//! - [`data`]: MNIST 数据集的下载、解析与批次采样
//! - [`gan`]: 生成器/判别器结构、对抗训练循环与检查点
//!

pub mod data;
pub mod errors;
pub mod gan;
pub mod logger;
pub mod nn;
pub mod tensor;
pub mod utils;
