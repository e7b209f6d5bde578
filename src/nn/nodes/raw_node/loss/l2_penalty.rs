/*
 * @Description  : L2 正则项节点
 *
 * penalty = scale * Σ_i sum(w_i²) / 2，父节点通常是一组参数节点
 * d(penalty)/d(w_i) = scale * w_i
 */

use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

pub(in crate::nn) struct L2Penalty {
    shape: Vec<usize>,
    parent_count: usize,
    scale: f32,
}

impl L2Penalty {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], scale: f32) -> Result<Self, GraphError> {
        if parents.is_empty() {
            return Err(GraphError::InvalidOperation(
                "L2Penalty节点至少需要1个父节点".to_string(),
            ));
        }
        if scale < 0.0 {
            return Err(GraphError::InvalidOperation(format!(
                "L2Penalty 的系数不能为负，得到 {scale}"
            )));
        }
        Ok(Self {
            shape: vec![1, 1],
            parent_count: parents.len(),
            scale,
        })
    }
}

impl TraitNode for L2Penalty {
    fn type_name(&self) -> &'static str {
        "L2Penalty"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let mut total = 0.0f32;
        for i in 0..self.parent_count {
            total += parent_value(parents, i)?.square().sum() / 2.0;
        }
        Ok(Tensor::new(&[self.scale * total], &self.shape))
    }

    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        parents: &[&NodeHandle],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if target_index >= self.parent_count {
            return Err(invalid_grad_target(self.type_name(), target_index));
        }
        let upstream = upstream_grad.get_data_number().ok_or_else(|| {
            GraphError::ComputationError("L2Penalty 的上游梯度必须是标量".to_string())
        })?;
        Ok(parent_value(parents, target_index)? * (self.scale * upstream))
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::L2Penalty { scale: self.scale }
    }
}
