/*
 * @Description  : 2D 卷积节点（NCHW，Batch-First）
 *
 * 父节点：
 * - parents[0]: 输入数据 [batch, C_in, H, W]
 * - parents[1]: 卷积核参数 [C_out, C_in, kH, kW]
 *
 * 实现方式：逐样本 im2col 后与卷积核矩阵相乘，batch 维用 Rayon 并行
 * - forward:  Y_n = K · im2col(X_n)
 * - backward: dX_n = col2im(Kᵀ · dY_n)，dK = Σ_n dY_n · im2col(X_n)ᵀ
 */

use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{
    ConvGeometry, TraitNode, check_parent_count, invalid_grad_target, matrix_view, parent_value,
};
use crate::nn::padding::Padding;
use crate::tensor::Tensor;
use ndarray::Array2;
use rayon::prelude::*;

pub(in crate::nn) struct Conv2d {
    shape: Vec<usize>,
    out_channels: usize,
    stride: (usize, usize),
    padding: Padding,
    geometry: ConvGeometry,
}

impl Conv2d {
    pub(in crate::nn) fn new(
        parents: &[&NodeHandle],
        stride: (usize, usize),
        padding: Padding,
    ) -> Result<Self, GraphError> {
        check_parent_count("Conv2d", parents, 2)?;
        let input_shape = parents[0].value_expected_shape();
        let kernel_shape = parents[1].value_expected_shape();

        if kernel_shape.len() != 4 {
            return Err(GraphError::DimensionMismatch {
                expected: 4,
                got: kernel_shape.len(),
                message: format!("卷积核必须是 4D [C_out, C_in, kH, kW]，得到 {kernel_shape:?}"),
            });
        }
        if input_shape.len() != 4 {
            return Err(GraphError::DimensionMismatch {
                expected: 4,
                got: input_shape.len(),
                message: format!(
                    "Conv2d 输入必须是 4D [batch, C_in, H, W]，得到 {input_shape:?}。单样本请使用 [1, C_in, H, W]"
                ),
            });
        }
        if input_shape[1] != kernel_shape[1] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![input_shape[1]],
                got: vec![kernel_shape[1]],
                message: "卷积核的输入通道数与输入数据的通道数不一致".to_string(),
            });
        }
        if stride.0 == 0 || stride.1 == 0 {
            return Err(GraphError::InvalidOperation("Conv2d 的步长不能为 0".to_string()));
        }

        let geometry = ConvGeometry::new(
            input_shape[1],
            (input_shape[2], input_shape[3]),
            (kernel_shape[2], kernel_shape[3]),
            stride,
            padding,
        );
        if geometry.out_h == 0 || geometry.out_w == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "Conv2d 输出尺寸为 0：输入 {input_shape:?}，卷积核 {kernel_shape:?}，填充 {padding:?}"
            )));
        }

        Ok(Self {
            shape: vec![input_shape[0], kernel_shape[0], geometry.out_h, geometry.out_w],
            out_channels: kernel_shape[0],
            stride,
            padding,
            geometry,
        })
    }
}

impl TraitNode for Conv2d {
    fn type_name(&self) -> &'static str {
        "Conv2d"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let input = parent_value(parents, 0)?;
        let g = self.geometry;
        let kernel = matrix_view(
            parent_value(parents, 1)?.data_as_slice(),
            self.out_channels,
            g.patch_len(),
        )?;

        let outputs: Vec<Vec<f32>> = input
            .data_as_slice()
            .par_chunks(g.input_len())
            .map(|sample| kernel.dot(&g.im2col(sample)).into_raw_vec())
            .collect();
        Ok(Tensor::from_vec(outputs.concat(), &self.shape))
    }

    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        parents: &[&NodeHandle],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let g = self.geometry;
        let out_len = self.out_channels * g.out_positions();
        let input = parent_value(parents, 0)?;
        let kernel_value = parent_value(parents, 1)?;
        let kernel = matrix_view(kernel_value.data_as_slice(), self.out_channels, g.patch_len())?;
        let upstream = upstream_grad.data_as_slice();

        match target_index {
            0 => {
                let grads = upstream
                    .par_chunks(out_len)
                    .map(|dy| -> Result<Vec<f32>, GraphError> {
                        let dy = matrix_view(dy, self.out_channels, g.out_positions())?;
                        Ok(g.col2im(kernel.t().dot(&dy).view()))
                    })
                    .collect::<Result<Vec<_>, GraphError>>()?;
                Ok(Tensor::from_vec(grads.concat(), input.shape()))
            }
            1 => {
                let grad = input
                    .data_as_slice()
                    .par_chunks(g.input_len())
                    .zip(upstream.par_chunks(out_len))
                    .map(|(x, dy)| -> Result<Array2<f32>, GraphError> {
                        let dy = matrix_view(dy, self.out_channels, g.out_positions())?;
                        Ok(dy.dot(&g.im2col(x).t()))
                    })
                    .collect::<Result<Vec<_>, GraphError>>()?
                    .into_iter()
                    // 按样本顺序累加，保证结果与线程调度无关
                    .fold(Array2::zeros((self.out_channels, g.patch_len())), |acc, per_sample| {
                        acc + per_sample
                    });
                Ok(Tensor::from_vec(grad.into_raw_vec(), kernel_value.shape()))
            }
            _ => Err(invalid_grad_target(self.type_name(), target_index)),
        }
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Conv2d {
            stride: self.stride,
            padding: self.padding,
        }
    }
}
