use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

/// 逐元素相加节点，两个父节点形状必须严格一致
pub(in crate::nn) struct Add {
    shape: Vec<usize>,
}

impl Add {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        check_parent_count("Add", parents, 2)?;
        let (a, b) = (
            parents[0].value_expected_shape(),
            parents[1].value_expected_shape(),
        );
        if a != b {
            return Err(GraphError::ShapeMismatch {
                expected: a.to_vec(),
                got: b.to_vec(),
                message: "Add节点的两个父节点形状必须一致".to_string(),
            });
        }
        Ok(Self { shape: a.to_vec() })
    }
}

impl TraitNode for Add {
    fn type_name(&self) -> &'static str {
        "Add"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        Ok(parent_value(parents, 0)? + parent_value(parents, 1)?)
    }

    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        _parents: &[&NodeHandle],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        match target_index {
            0 | 1 => Ok(upstream_grad.clone()),
            _ => Err(invalid_grad_target(self.type_name(), target_index)),
        }
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Add
    }
}
