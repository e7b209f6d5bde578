/*
 * @Description  : BiasAdd 节点：把形状为 [1, C] 的偏置按通道广播加到输入上
 *
 * 输入可以是全连接层输出 [batch, C]，也可以是卷积输出 [batch, C, H, W]
 * 数学：output[b, c, ...] = input[b, c, ...] + bias[c]
 */

use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

pub(in crate::nn) struct BiasAdd {
    shape: Vec<usize>,
    channels: usize,
}

impl BiasAdd {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        check_parent_count("BiasAdd", parents, 2)?;
        let input_shape = parents[0].value_expected_shape();
        let bias_shape = parents[1].value_expected_shape();

        if input_shape.len() != 2 && input_shape.len() != 4 {
            return Err(GraphError::InvalidOperation(format!(
                "BiasAdd 的 input 必须是 2D [batch, C] 或 4D [batch, C, H, W]，实际为 {input_shape:?}"
            )));
        }
        let channels = input_shape[1];
        if bias_shape != [1, channels] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![1, channels],
                got: bias_shape.to_vec(),
                message: "BiasAdd 的 bias 必须是 [1, C]，且 C 与 input 通道数一致".to_string(),
            });
        }
        Ok(Self {
            shape: input_shape.to_vec(),
            channels,
        })
    }

    /// 每个通道连续元素的个数（全连接时为 1）
    fn spatial(&self) -> usize {
        self.shape[2..].iter().product()
    }
}

impl TraitNode for BiasAdd {
    fn type_name(&self) -> &'static str {
        "BiasAdd"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let input = parent_value(parents, 0)?;
        let bias = parent_value(parents, 1)?.data_as_slice();
        let spatial = self.spatial();

        let mut output = input.clone();
        for (i, chunk) in output.data_as_slice_mut().chunks_mut(spatial).enumerate() {
            let b = bias[i % self.channels];
            chunk.iter_mut().for_each(|v| *v += b);
        }
        Ok(output)
    }

    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        _parents: &[&NodeHandle],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        match target_index {
            0 => Ok(upstream_grad.clone()),
            // 偏置梯度：对 batch 与空间维度求和
            1 => Ok(Tensor::from_vec(
                upstream_grad.channel_sums(),
                &[1, self.channels],
            )),
            _ => Err(invalid_grad_target(self.type_name(), target_index)),
        }
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::BiasAdd
    }
}
