/*
 * @Description  : 优化器模块，实现 TensorFlow-1 风格的梯度优化算法
 */

mod core;
mod rmsprop;

pub use core::Optimizer;
pub use rmsprop::{RMSProp, RmsPropSlot, RmsPropState};
