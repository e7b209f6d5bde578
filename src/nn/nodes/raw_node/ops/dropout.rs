/*
 * @Description  : Dropout 节点（inverted dropout）
 *
 * 训练模式：每个元素以概率 rate 置零，保留的元素放大 1/(1-rate)，保持期望不变
 * 评估模式（或 rate 为 0）：恒等映射
 *
 * 节点自带随机数生成器，种子在建图时从图的 RNG 派生，故种子相同的图掩码序列相同
 */

use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;
use rand::Rng;
use rand::rngs::StdRng;

pub(in crate::nn) struct Dropout {
    shape: Vec<usize>,
    rate: f32,
    training: bool,
    rng: StdRng,
    /// 最近一次训练模式前向传播使用的掩码（已含 1/(1-rate) 缩放），供反向传播使用
    mask: Option<Tensor>,
}

impl Dropout {
    pub(in crate::nn) fn new(
        parents: &[&NodeHandle],
        rate: f32,
        training: bool,
        rng: StdRng,
    ) -> Result<Self, GraphError> {
        check_parent_count("Dropout", parents, 1)?;
        if !(0.0..1.0).contains(&rate) {
            return Err(GraphError::InvalidOperation(format!(
                "Dropout的rate必须在[0, 1)内，但得到: {rate}"
            )));
        }
        Ok(Self {
            shape: parents[0].value_expected_shape().to_vec(),
            rate,
            training,
            rng,
            mask: None,
        })
    }

    fn is_active(&self) -> bool {
        self.training && self.rate > 0.0
    }
}

impl TraitNode for Dropout {
    fn type_name(&self) -> &'static str {
        "Dropout"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let input = parent_value(parents, 0)?;
        if !self.is_active() {
            self.mask = None;
            return Ok(input.clone());
        }

        let keep = 1.0 - self.rate;
        let scale = 1.0 / keep;
        let rng = &mut self.rng;
        let mask_data = (0..input.size())
            .map(|_| if rng.gen_bool(f64::from(keep)) { scale } else { 0.0 })
            .collect::<Vec<_>>();
        let mask = Tensor::from_vec(mask_data, input.shape());
        let output = input * &mask;
        self.mask = Some(mask);
        Ok(output)
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
        match &self.mask {
            Some(mask) => Ok(upstream_grad * mask),
            None => Ok(upstream_grad.clone()),
        }
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Dropout { rate: self.rate }
    }
}
