/*
 * @Description  : Var 矩阵运算扩展 trait
 */

use crate::nn::{GraphError, Var};

pub trait VarMatrixOps {
    /// 矩阵乘法：[m, k] x [k, n] -> [m, n]
    fn matmul(&self, other: &Var) -> Result<Var, GraphError>;

    /// 按通道加偏置，`bias`形状为 [1, C]
    fn bias_add(&self, bias: &Var) -> Result<Var, GraphError>;

    /// 数乘
    fn scale(&self, scalar: f32) -> Result<Var, GraphError>;
}

impl VarMatrixOps for Var {
    fn matmul(&self, other: &Var) -> Result<Var, GraphError> {
        self.check_same_graph(other, "矩阵乘法")?;
        self.derive(|g| g.new_mat_mul_node(self.node_id(), other.node_id(), None))
    }

    fn bias_add(&self, bias: &Var) -> Result<Var, GraphError> {
        self.check_same_graph(bias, "偏置加法")?;
        self.derive(|g| g.new_bias_add_node(self.node_id(), bias.node_id(), None))
    }

    fn scale(&self, scalar: f32) -> Result<Var, GraphError> {
        self.derive(|g| g.new_scalar_multiply_node(self.node_id(), scalar, None))
    }
}
