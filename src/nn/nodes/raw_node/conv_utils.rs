/*
 * @Description  : 卷积的 im2col / col2im 公共实现。
 *                 Conv2d 与 ConvTranspose2d 共用：前者前向用 im2col，后者前向用 col2im，
 *                 反向则恰好互换。所有函数都只处理单个样本，batch 维的并行交给调用方（rayon）。
 */

use crate::nn::GraphError;
use crate::nn::padding::Padding;
use ndarray::{Array2, ArrayView2};

/// 把连续切片按行优先解释为 [rows, cols] 矩阵视图
pub(in crate::nn) fn matrix_view(
    data: &[f32],
    rows: usize,
    cols: usize,
) -> Result<ArrayView2<'_, f32>, GraphError> {
    ArrayView2::from_shape((rows, cols), data).map_err(|e| {
        GraphError::ComputationError(format!(
            "无法把长度为{}的数据视为[{rows}, {cols}]矩阵：{e}",
            data.len()
        ))
    })
}

/// 一次“普通卷积”的几何信息（单样本，NCHW 中的 CHW 部分）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::nn) struct ConvGeometry {
    pub channels: usize,
    pub in_h: usize,
    pub in_w: usize,
    pub kernel_h: usize,
    pub kernel_w: usize,
    pub stride_h: usize,
    pub stride_w: usize,
    pub pad_top: usize,
    pub pad_left: usize,
    pub out_h: usize,
    pub out_w: usize,
}

impl ConvGeometry {
    pub(in crate::nn) fn new(
        channels: usize,
        (in_h, in_w): (usize, usize),
        (kernel_h, kernel_w): (usize, usize),
        (stride_h, stride_w): (usize, usize),
        padding: Padding,
    ) -> Self {
        Self {
            channels,
            in_h,
            in_w,
            kernel_h,
            kernel_w,
            stride_h,
            stride_w,
            pad_top: padding.conv_pads(in_h, kernel_h, stride_h).0,
            pad_left: padding.conv_pads(in_w, kernel_w, stride_w).0,
            out_h: padding.conv_output_size(in_h, kernel_h, stride_h),
            out_w: padding.conv_output_size(in_w, kernel_w, stride_w),
        }
    }

    pub(in crate::nn) fn input_len(&self) -> usize {
        self.channels * self.in_h * self.in_w
    }

    /// im2col 矩阵的行数：C * kH * kW
    pub(in crate::nn) fn patch_len(&self) -> usize {
        self.channels * self.kernel_h * self.kernel_w
    }

    /// im2col 矩阵的列数：输出的空间位置数
    pub(in crate::nn) fn out_positions(&self) -> usize {
        self.out_h * self.out_w
    }

    /// 输出位置(oy, ox)在卷积核偏移(ky, kx)处对应的输入坐标；落在填充区则返回 None
    #[inline]
    fn source(&self, oy: usize, ox: usize, ky: usize, kx: usize) -> Option<(usize, usize)> {
        let y = (oy * self.stride_h + ky).checked_sub(self.pad_top)?;
        let x = (ox * self.stride_w + kx).checked_sub(self.pad_left)?;
        (y < self.in_h && x < self.in_w).then_some((y, x))
    }

    /// 把单个样本 [C, H, W] 展开为 [C*kH*kW, outH*outW]
    pub(in crate::nn) fn im2col(&self, sample: &[f32]) -> Array2<f32> {
        let mut cols = Array2::<f32>::zeros((self.patch_len(), self.out_positions()));
        for c in 0..self.channels {
            let plane = &sample[c * self.in_h * self.in_w..(c + 1) * self.in_h * self.in_w];
            for ky in 0..self.kernel_h {
                for kx in 0..self.kernel_w {
                    let row = (c * self.kernel_h + ky) * self.kernel_w + kx;
                    let mut row_view = cols.row_mut(row);
                    for oy in 0..self.out_h {
                        for ox in 0..self.out_w {
                            if let Some((y, x)) = self.source(oy, ox, ky, kx) {
                                row_view[oy * self.out_w + ox] = plane[y * self.in_w + x];
                            }
                        }
                    }
                }
            }
        }
        cols
    }

    /// im2col 的伴随运算：把 [C*kH*kW, outH*outW] 累加回 [C, H, W]
    pub(in crate::nn) fn col2im(&self, cols: ArrayView2<'_, f32>) -> Vec<f32> {
        let mut sample = vec![0.0f32; self.input_len()];
        for c in 0..self.channels {
            let base = c * self.in_h * self.in_w;
            for ky in 0..self.kernel_h {
                for kx in 0..self.kernel_w {
                    let row = cols.row((c * self.kernel_h + ky) * self.kernel_w + kx);
                    for oy in 0..self.out_h {
                        for ox in 0..self.out_w {
                            if let Some((y, x)) = self.source(oy, ox, ky, kx) {
                                sample[base + y * self.in_w + x] += row[oy * self.out_w + ox];
                            }
                        }
                    }
                }
            }
        }
        sample
    }
}
