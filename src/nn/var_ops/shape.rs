/*
 * @Description  : Var 形状变换扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 形状变换扩展 trait
///
/// - `reshape(shape)`: 变形为指定形状
/// - `flatten()`: 展平为 `[batch, 其余元素]`
/// - `resize_bilinear((h, w))`: 对 [batch, C, H, W] 做双线性缩放
pub trait VarShapeOps {
    fn reshape(&self, shape: &[usize]) -> Result<Var, GraphError>;

    fn flatten(&self) -> Result<Var, GraphError>;

    fn resize_bilinear(&self, size: (usize, usize)) -> Result<Var, GraphError>;
}

impl VarShapeOps for Var {
    fn reshape(&self, shape: &[usize]) -> Result<Var, GraphError> {
        self.derive(|g| g.new_reshape_node(self.node_id(), shape, None))
    }

    fn flatten(&self) -> Result<Var, GraphError> {
        let shape = self.value_expected_shape()?;
        let batch = shape.first().copied().unwrap_or(1);
        let rest: usize = shape.iter().skip(1).product();
        self.reshape(&[batch, rest])
    }

    fn resize_bilinear(&self, size: (usize, usize)) -> Result<Var, GraphError> {
        self.derive(|g| g.new_resize_bilinear_node(self.node_id(), size, None))
    }
}
