use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

/// 数乘节点：y = scalar * x
pub(in crate::nn) struct ScalarMultiply {
    shape: Vec<usize>,
    scalar: f32,
}

impl ScalarMultiply {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], scalar: f32) -> Result<Self, GraphError> {
        check_parent_count("ScalarMultiply", parents, 1)?;
        Ok(Self {
            shape: parents[0].value_expected_shape().to_vec(),
            scalar,
        })
    }
}

impl TraitNode for ScalarMultiply {
    fn type_name(&self) -> &'static str {
        "ScalarMultiply"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        Ok(parent_value(parents, 0)? * self.scalar)
    }

    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        _parents: &[&NodeHandle],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if target_index != 0 {
            return Err(invalid_grad_target(self.type_name(), target_index));
        }
        Ok(upstream_grad * self.scalar)
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::ScalarMultiply {
            scalar: self.scalar,
        }
    }
}
