use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

/// 矩阵乘法节点：[m, k] x [k, n] -> [m, n]
///
/// backward:
/// - dL/dA = dL/dC · Bᵀ
/// - dL/dB = Aᵀ · dL/dC
pub(in crate::nn) struct MatMul {
    shape: Vec<usize>,
}

impl MatMul {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        check_parent_count("MatMul", parents, 2)?;
        let (a, b) = (
            parents[0].value_expected_shape(),
            parents[1].value_expected_shape(),
        );
        if a.len() != 2 || b.len() != 2 {
            return Err(GraphError::DimensionMismatch {
                expected: 2,
                got: a.len().max(b.len()),
                message: format!("MatMul节点只支持二维矩阵，得到{a:?}与{b:?}"),
            });
        }
        if a[1] != b[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![a[1], b[1]],
                got: b.to_vec(),
                message: format!("MatMul节点左矩阵列数{}与右矩阵行数{}不一致", a[1], b[0]),
            });
        }
        Ok(Self {
            shape: vec![a[0], b[1]],
        })
    }
}

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "MatMul"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        Ok(parent_value(parents, 0)?.mat_mul(parent_value(parents, 1)?))
    }

    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        parents: &[&NodeHandle],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        match target_index {
            0 => Ok(upstream_grad.mat_mul(&parent_value(parents, 1)?.transpose())),
            1 => Ok(parent_value(parents, 0)?.transpose().mat_mul(upstream_grad)),
            _ => Err(invalid_grad_target(self.type_name(), target_index)),
        }
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::MatMul
    }
}
