use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

/// 形状变换节点，元素总数必须不变（展平也用它）
pub(in crate::nn) struct Reshape {
    target_shape: Vec<usize>,
    input_shape: Vec<usize>,
}

impl Reshape {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], target_shape: &[usize]) -> Result<Self, GraphError> {
        check_parent_count("Reshape", parents, 1)?;
        let input_shape = parents[0].value_expected_shape();
        let (from, to) = (
            input_shape.iter().product::<usize>(),
            target_shape.iter().product::<usize>(),
        );
        if from != to {
            return Err(GraphError::ShapeMismatch {
                expected: input_shape.to_vec(),
                got: target_shape.to_vec(),
                message: format!("Reshape前后元素个数不一致：{from} vs {to}"),
            });
        }
        Ok(Self {
            target_shape: target_shape.to_vec(),
            input_shape: input_shape.to_vec(),
        })
    }
}

impl TraitNode for Reshape {
    fn type_name(&self) -> &'static str {
        "Reshape"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.target_shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        Ok(parent_value(parents, 0)?.reshape(&self.target_shape))
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
        Ok(upstream_grad.reshape(&self.input_shape))
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Reshape {
            target_shape: self.target_shape.clone(),
        }
    }
}
