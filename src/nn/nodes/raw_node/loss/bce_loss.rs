/*
 * @Description  : 二元交叉熵损失节点（目标为常数）
 *
 * loss = mean(-(t * ln(p + eps) + (1 - t) * ln(1 - p + eps)))
 * 输出形状为 [1, 1]。eps 防止 ln(0)，默认 1e-12
 */

use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

pub(in crate::nn) struct BceLoss {
    shape: Vec<usize>,
    target: f32,
    eps: f32,
}

impl BceLoss {
    pub(in crate::nn) const DEFAULT_EPS: f32 = 1e-12;

    pub(in crate::nn) fn new(parents: &[&NodeHandle], target: f32, eps: f32) -> Result<Self, GraphError> {
        check_parent_count("BceLoss", parents, 1)?;
        if !(0.0..=1.0).contains(&target) {
            return Err(GraphError::InvalidOperation(format!(
                "BceLoss 的目标值必须在[0, 1]内，得到 {target}"
            )));
        }
        Ok(Self {
            shape: vec![1, 1],
            target,
            eps,
        })
    }
}

impl TraitNode for BceLoss {
    fn type_name(&self) -> &'static str {
        "BceLoss"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let (t, eps) = (self.target, self.eps);
        let loss = parent_value(parents, 0)?
            .map(|p| -(t * (p + eps).ln() + (1.0 - t) * (1.0 - p + eps).ln()))
            .mean();
        Ok(Tensor::new(&[loss], &self.shape))
    }

    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        parents: &[&NodeHandle],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if target_index != 0 {
            return Err(invalid_grad_target(self.type_name(), target_index));
        }
        let upstream = upstream_grad.get_data_number().ok_or_else(|| {
            GraphError::ComputationError("BceLoss 的上游梯度必须是标量".to_string())
        })?;
        let (t, eps) = (self.target, self.eps);
        let prediction = parent_value(parents, 0)?;
        let n = prediction.size() as f32;
        Ok(prediction.map(|p| upstream / n * (-t / (p + eps) + (1.0 - t) / (1.0 - p + eps))))
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::BceLoss {
            target: self.target,
            eps: self.eps,
        }
    }
}
