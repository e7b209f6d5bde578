/*
 * @Description  : Var 损失函数扩展 trait
 */

use crate::nn::{GraphError, Var};

pub trait VarLossOps {
    /// 与常数目标`target`之间的二元交叉熵（对所有元素取均值），输出 [1, 1]
    ///
    /// ```ignore
    /// let loss_real = d_real.bce_loss(1.0)?;
    /// let loss_fake = d_fake.bce_loss(0.0)?;
    /// ```
    fn bce_loss(&self, target: f32) -> Result<Var, GraphError>;
}

impl VarLossOps for Var {
    fn bce_loss(&self, target: f32) -> Result<Var, GraphError> {
        self.derive(|g| g.new_bce_loss_node(self.node_id(), target, None))
    }
}
