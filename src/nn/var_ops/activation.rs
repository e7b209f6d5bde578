/*
 * @Description  : Var 激活函数扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 激活函数扩展 trait
///
/// - `sigmoid()`: 1 / (1 + exp(-x))
/// - `leaky_relu(alpha)`: max(x, alpha * x)
/// - `dropout(rate)`: 训练模式下随机置零（评估模式下为恒等映射）
pub trait VarActivationOps {
    fn sigmoid(&self) -> Result<Var, GraphError>;

    fn leaky_relu(&self, alpha: f32) -> Result<Var, GraphError>;

    fn dropout(&self, rate: f32) -> Result<Var, GraphError>;
}

impl VarActivationOps for Var {
    fn sigmoid(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_sigmoid_node(self.node_id(), None))
    }

    fn leaky_relu(&self, alpha: f32) -> Result<Var, GraphError> {
        self.derive(|g| g.new_leaky_relu_node(self.node_id(), alpha, None))
    }

    fn dropout(&self, rate: f32) -> Result<Var, GraphError> {
        self.derive(|g| g.new_dropout_node(self.node_id(), rate, None))
    }
}
