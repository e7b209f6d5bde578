/*
 * @Description  : 卷积的填充方式与输出尺寸计算（与 TensorFlow 的 `padding='same'/'valid'` 语义一致）
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Padding {
    /// 不填充
    Valid,
    /// 输出尺寸为 `ceil(in / stride)`；填充总量不均分时，多出的一格补在后侧
    Same,
}

impl Padding {
    /// 普通卷积单个空间维度的输出尺寸
    pub fn conv_output_size(&self, input: usize, kernel: usize, stride: usize) -> usize {
        match self {
            Self::Valid => {
                if input < kernel {
                    0
                } else {
                    (input - kernel) / stride + 1
                }
            }
            Self::Same => input.div_ceil(stride),
        }
    }

    /// 普通卷积单个空间维度的（前侧, 后侧）填充量
    pub fn conv_pads(&self, input: usize, kernel: usize, stride: usize) -> (usize, usize) {
        match self {
            Self::Valid => (0, 0),
            Self::Same => {
                let output = self.conv_output_size(input, kernel, stride);
                let needed = (output.saturating_sub(1)) * stride + kernel;
                let total = needed.saturating_sub(input);
                (total / 2, total - total / 2)
            }
        }
    }

    /// 转置卷积单个空间维度的输出尺寸
    pub fn conv_transpose_output_size(&self, input: usize, kernel: usize, stride: usize) -> usize {
        match self {
            Self::Valid => (input.saturating_sub(1)) * stride + kernel,
            Self::Same => input * stride,
        }
    }

    /// 转置卷积单个空间维度的填充量。
    /// 转置卷积是“以输出为输入”的普通卷积的伴随运算，故填充按输出尺寸求
    pub fn conv_transpose_pads(&self, input: usize, kernel: usize, stride: usize) -> (usize, usize) {
        let output = self.conv_transpose_output_size(input, kernel, stride);
        self.conv_pads(output, kernel, stride)
    }
}
