use super::{NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::tensor::Tensor;

/// 输入节点：值只能由外部喂入，不参与梯度计算
pub(in crate::nn) struct Input {
    shape: Vec<usize>,
}

impl Input {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        if shape.is_empty() || shape.contains(&0) {
            return Err(GraphError::InvalidOperation(format!(
                "输入节点的形状不能为空或含 0 维：{shape:?}"
            )));
        }
        Ok(Self {
            shape: shape.to_vec(),
        })
    }
}

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, _parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "输入节点的值需要通过set_node_value喂入，不能由前向传播计算".to_string(),
        ))
    }

    fn calc_grad_to_parent(
        &self,
        _target_index: usize,
        _parents: &[&NodeHandle],
        _value: &Tensor,
        _upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "输入节点没有父节点，无需计算梯度".to_string(),
        ))
    }

    fn accepts_external_value(&self) -> bool {
        true
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Input
    }
}
