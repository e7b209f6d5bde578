/*
 * @Description  : 双线性缩放节点（NCHW）
 *
 * 采样方式与 TensorFlow 1.x 的 `tf.image.resize_images` 默认行为一致：
 * 不对齐角点、不做半像素偏移，即 src = dst * in / out，越界时取边缘像素。
 */

use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

/// 单个空间维度上的插值表：(下侧下标, 上侧下标, 上侧权重)
fn axis_table(input: usize, output: usize) -> Vec<(usize, usize, f32)> {
    let scale = input as f32 / output as f32;
    (0..output)
        .map(|dst| {
            let src = dst as f32 * scale;
            let lo = (src.floor() as usize).min(input - 1);
            let hi = (lo + 1).min(input - 1);
            (lo, hi, src - lo as f32)
        })
        .collect()
}

pub(in crate::nn) struct ResizeBilinear {
    shape: Vec<usize>,
    input_shape: Vec<usize>,
    rows: Vec<(usize, usize, f32)>,
    cols: Vec<(usize, usize, f32)>,
}

impl ResizeBilinear {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], size: (usize, usize)) -> Result<Self, GraphError> {
        check_parent_count("ResizeBilinear", parents, 1)?;
        let input_shape = parents[0].value_expected_shape();
        if input_shape.len() != 4 {
            return Err(GraphError::DimensionMismatch {
                expected: 4,
                got: input_shape.len(),
                message: "ResizeBilinear 的输入必须是 [batch, C, H, W]".to_string(),
            });
        }
        if size.0 == 0 || size.1 == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "ResizeBilinear 的目标尺寸不能为 0：{size:?}"
            )));
        }
        let (h, w) = (input_shape[2], input_shape[3]);
        Ok(Self {
            shape: vec![input_shape[0], input_shape[1], size.0, size.1],
            input_shape: input_shape.to_vec(),
            rows: axis_table(h, size.0),
            cols: axis_table(w, size.1),
        })
    }

    fn planes(&self) -> usize {
        self.input_shape[0] * self.input_shape[1]
    }
}

impl TraitNode for ResizeBilinear {
    fn type_name(&self) -> &'static str {
        "ResizeBilinear"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let input = parent_value(parents, 0)?.data_as_slice();
        let (in_h, in_w) = (self.input_shape[2], self.input_shape[3]);
        let (out_h, out_w) = (self.shape[2], self.shape[3]);

        let mut output = Vec::with_capacity(self.planes() * out_h * out_w);
        for plane in input.chunks(in_h * in_w) {
            for &(y0, y1, wy) in &self.rows {
                for &(x0, x1, wx) in &self.cols {
                    let top = plane[y0 * in_w + x0] * (1.0 - wx) + plane[y0 * in_w + x1] * wx;
                    let bottom = plane[y1 * in_w + x0] * (1.0 - wx) + plane[y1 * in_w + x1] * wx;
                    output.push(top * (1.0 - wy) + bottom * wy);
                }
            }
        }
        Ok(Tensor::from_vec(output, &self.shape))
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
        let (in_h, in_w) = (self.input_shape[2], self.input_shape[3]);
        let (out_h, out_w) = (self.shape[2], self.shape[3]);
        let mut grad = Tensor::zeros(&self.input_shape);

        for (plane, up) in grad
            .data_as_slice_mut()
            .chunks_mut(in_h * in_w)
            .zip(upstream_grad.data_as_slice().chunks(out_h * out_w))
        {
            for (oy, &(y0, y1, wy)) in self.rows.iter().enumerate() {
                for (ox, &(x0, x1, wx)) in self.cols.iter().enumerate() {
                    let g = up[oy * out_w + ox];
                    plane[y0 * in_w + x0] += g * (1.0 - wy) * (1.0 - wx);
                    plane[y0 * in_w + x1] += g * (1.0 - wy) * wx;
                    plane[y1 * in_w + x0] += g * wy * (1.0 - wx);
                    plane[y1 * in_w + x1] += g * wy * wx;
                }
            }
        }
        Ok(grad)
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::ResizeBilinear {
            size: (self.shape[2], self.shape[3]),
        }
    }
}
