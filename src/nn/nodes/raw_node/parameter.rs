use super::{NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::tensor::Tensor;
use rand::Rng;

/// 参数初始化方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    Zeros,
    Ones,
    /// Xavier/Glorot 均匀分布：U(-limit, limit)，limit = sqrt(6 / (fan_in + fan_out))
    GlorotUniform { fan_in: usize, fan_out: usize },
}

impl Init {
    pub fn generate<R: Rng + ?Sized>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        match *self {
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::GlorotUniform { fan_in, fan_out } => {
                let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
                Tensor::uniform_with_rng(-limit, limit, shape, rng)
            }
        }
    }
}

/// 可训练参数节点
pub(in crate::nn) struct Parameter {
    shape: Vec<usize>,
}

impl Parameter {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        // 支持 1-4 维张量：
        // - 2D: 全连接权重 [in, out]、偏置 [1, out]
        // - 4D: 卷积核
        if shape.is_empty() || shape.len() > 4 {
            return Err(GraphError::DimensionMismatch {
                expected: 2,
                got: shape.len(),
                message: format!(
                    "参数张量必须是 1-4 维，但收到的维度是 {} 维。",
                    shape.len()
                ),
            });
        }
        if shape.contains(&0) {
            return Err(GraphError::InvalidOperation(format!(
                "参数形状不能含 0 维：{shape:?}"
            )));
        }
        Ok(Self {
            shape: shape.to_vec(),
        })
    }
}

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, _parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "参数节点的值在创建时初始化，不能由前向传播计算".to_string(),
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
            "参数节点没有父节点，无需计算梯度".to_string(),
        ))
    }

    fn accepts_external_value(&self) -> bool {
        true
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Parameter
    }
}
