/*
 * @Description  : 2D 转置卷积节点（NCHW，Batch-First）
 *
 * 父节点：
 * - parents[0]: 输入数据 [batch, C_in, H, W]
 * - parents[1]: 卷积核参数 [C_in, C_out, kH, kW]
 *
 * 转置卷积即“从输出到输入的普通卷积”的伴随运算。几何信息按该普通卷积描述
 * （其输入为本节点的输出 [C_out, H', W']，输出为本节点的输入 [C_in, H, W]），于是：
 * - forward:  Y_n = col2im(Kᵀ · X_n)
 * - backward: dX_n = K · im2col(dY_n)，dK = Σ_n X_n · im2col(dY_n)ᵀ
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

pub(in crate::nn) struct ConvTranspose2d {
    shape: Vec<usize>,
    in_channels: usize,
    stride: (usize, usize),
    padding: Padding,
    /// 伴随的普通卷积：[C_out, H', W'] -> [C_in, H, W]
    geometry: ConvGeometry,
}

impl ConvTranspose2d {
    pub(in crate::nn) fn new(
        parents: &[&NodeHandle],
        stride: (usize, usize),
        padding: Padding,
    ) -> Result<Self, GraphError> {
        check_parent_count("ConvTranspose2d", parents, 2)?;
        let input_shape = parents[0].value_expected_shape();
        let kernel_shape = parents[1].value_expected_shape();

        if kernel_shape.len() != 4 {
            return Err(GraphError::DimensionMismatch {
                expected: 4,
                got: kernel_shape.len(),
                message: format!("转置卷积核必须是 4D [C_in, C_out, kH, kW]，得到 {kernel_shape:?}"),
            });
        }
        if input_shape.len() != 4 {
            return Err(GraphError::DimensionMismatch {
                expected: 4,
                got: input_shape.len(),
                message: format!("ConvTranspose2d 输入必须是 4D [batch, C_in, H, W]，得到 {input_shape:?}"),
            });
        }
        if input_shape[1] != kernel_shape[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![input_shape[1]],
                got: vec![kernel_shape[0]],
                message: "转置卷积核的输入通道数与输入数据的通道数不一致".to_string(),
            });
        }
        if stride.0 == 0 || stride.1 == 0 {
            return Err(GraphError::InvalidOperation(
                "ConvTranspose2d 的步长不能为 0".to_string(),
            ));
        }

        let (in_h, in_w) = (input_shape[2], input_shape[3]);
        let (kernel_h, kernel_w) = (kernel_shape[2], kernel_shape[3]);
        let out_h = padding.conv_transpose_output_size(in_h, kernel_h, stride.0);
        let out_w = padding.conv_transpose_output_size(in_w, kernel_w, stride.1);
        let geometry = ConvGeometry::new(
            kernel_shape[1],
            (out_h, out_w),
            (kernel_h, kernel_w),
            stride,
            padding,
        );
        // 伴随卷积必须恰好把输出映回输入尺寸
        if (geometry.out_h, geometry.out_w) != (in_h, in_w) {
            return Err(GraphError::ComputationError(format!(
                "转置卷积几何不一致：{:?} 无法映回 {:?}",
                (out_h, out_w),
                (in_h, in_w)
            )));
        }

        Ok(Self {
            shape: vec![input_shape[0], kernel_shape[1], out_h, out_w],
            in_channels: input_shape[1],
            stride,
            padding,
            geometry,
        })
    }
}

impl TraitNode for ConvTranspose2d {
    fn type_name(&self) -> &'static str {
        "ConvTranspose2d"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let input = parent_value(parents, 0)?;
        let g = self.geometry;
        let kernel = matrix_view(
            parent_value(parents, 1)?.data_as_slice(),
            self.in_channels,
            g.patch_len(),
        )?;

        let outputs = input
            .data_as_slice()
            .par_chunks(self.in_channels * g.out_positions())
            .map(|x| -> Result<Vec<f32>, GraphError> {
                let x = matrix_view(x, self.in_channels, g.out_positions())?;
                Ok(g.col2im(kernel.t().dot(&x).view()))
            })
            .collect::<Result<Vec<_>, GraphError>>()?;
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
        let in_len = self.in_channels * g.out_positions();
        let input = parent_value(parents, 0)?;
        let kernel_value = parent_value(parents, 1)?;
        let kernel = matrix_view(kernel_value.data_as_slice(), self.in_channels, g.patch_len())?;
        let upstream = upstream_grad.data_as_slice();

        match target_index {
            0 => {
                let grads: Vec<Vec<f32>> = upstream
                    .par_chunks(g.input_len())
                    .map(|dy| kernel.dot(&g.im2col(dy)).into_raw_vec())
                    .collect();
                Ok(Tensor::from_vec(grads.concat(), input.shape()))
            }
            1 => {
                let grad = input
                    .data_as_slice()
                    .par_chunks(in_len)
                    .zip(upstream.par_chunks(g.input_len()))
                    .map(|(x, dy)| -> Result<Array2<f32>, GraphError> {
                        let x = matrix_view(x, self.in_channels, g.out_positions())?;
                        Ok(x.dot(&g.im2col(dy).t()))
                    })
                    .collect::<Result<Vec<_>, GraphError>>()?
                    .into_iter()
                    // 按样本顺序累加，保证结果与线程调度无关
                    .fold(Array2::zeros((self.in_channels, g.patch_len())), |acc, per_sample| {
                        acc + per_sample
                    });
                Ok(Tensor::from_vec(grad.into_raw_vec(), kernel_value.shape()))
            }
            _ => Err(invalid_grad_target(self.type_name(), target_index)),
        }
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::ConvTranspose2d {
            stride: self.stride,
            padding: self.padding,
        }
    }
}
