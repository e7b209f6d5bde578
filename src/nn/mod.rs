/*
 * @Description  : 负责神经网络（neural network）的构建：
 *                 静态计算图、反向传播、常用层与优化器
 */

mod descriptor;
mod graph;
pub mod layer;
mod module;
mod nodes;
pub mod optimizer;
mod padding;
mod var;
mod var_ops;

pub use descriptor::{GraphDescriptor, NodeDescriptor, NodeTypeDescriptor};
pub use graph::{Graph, GraphError, GraphInner};
pub use layer::{BatchNorm, Conv2d, ConvTranspose2d, Dropout, Linear};
pub use module::Module;
pub use nodes::{Init, NodeHandle, NodeId};
pub use optimizer::{Optimizer, RMSProp, RmsPropSlot, RmsPropState};
pub use padding::Padding;
pub use var::Var;
pub use var_ops::{VarActivationOps, VarLossOps, VarMatrixOps, VarShapeOps};

#[cfg(test)]
mod tests;
