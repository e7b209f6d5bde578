use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

/// Leaky ReLU 激活函数节点
///
/// forward: f(x) = max(x, negative_slope * x)
/// backward: d(f)/dx = 1 if x > 0, else negative_slope
///
/// 当 negative_slope = 0 时，等价于标准 ReLU
pub(in crate::nn) struct LeakyReLU {
    shape: Vec<usize>,
    negative_slope: f32,
}

impl LeakyReLU {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], negative_slope: f32) -> Result<Self, GraphError> {
        check_parent_count("LeakyReLU", parents, 1)?;
        if !(0.0..1.0).contains(&negative_slope) {
            return Err(GraphError::InvalidOperation(format!(
                "LeakyReLU的negative_slope应在[0, 1)内，但得到: {negative_slope}"
            )));
        }
        Ok(Self {
            shape: parents[0].value_expected_shape().to_vec(),
            negative_slope,
        })
    }
}

impl TraitNode for LeakyReLU {
    fn type_name(&self) -> &'static str {
        "LeakyReLU"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let slope = self.negative_slope;
        Ok(parent_value(parents, 0)?.where_with_f32(|x| x > 0.0, |x| x, |x| slope * x))
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
        let slope = self.negative_slope;
        let x = parent_value(parents, 0)?;
        Ok(upstream_grad.zip_map(x, |g, x| if x > 0.0 { g } else { slope * g }))
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::LeakyReLU {
            alpha: self.negative_slope,
        }
    }
}
