/*
 * @Description  : ConvTranspose2d (2D 转置卷积) 层
 */

use crate::nn::Padding;
use crate::nn::{Graph, GraphError, Init, Module, Var, VarMatrixOps};

/// ConvTranspose2d 层（上采样卷积）
///
/// # 输入/输出形状
/// - 输入：[batch, in_channels, H, W]
/// - 输出：[batch, out_channels, H * stride, W * stride]（Same 填充）
#[derive(Debug)]
pub struct ConvTranspose2d {
    /// 卷积核 [in_channels, out_channels, kH, kW]
    kernel: Var,
    /// 偏置 [1, out_channels]
    bias: Var,
    stride: (usize, usize),
    padding: Padding,
}

impl ConvTranspose2d {
    pub fn new(
        graph: &Graph,
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: Padding,
        name: &str,
    ) -> Result<Self, GraphError> {
        let (kh, kw) = kernel_size;
        // 转置卷积的 fan_in/fan_out 与对应普通卷积互换
        let kernel = graph.parameter(
            &[in_channels, out_channels, kh, kw],
            Init::GlorotUniform {
                fan_in: kh * kw * out_channels,
                fan_out: kh * kw * in_channels,
            },
            &format!("{name}/kernel"),
        )?;
        let bias = graph.parameter(&[1, out_channels], Init::Zeros, &format!("{name}/bias"))?;
        Ok(Self {
            kernel,
            bias,
            stride,
            padding,
        })
    }

    pub fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        x.check_same_graph(&self.kernel, "转置卷积")?;
        let (kernel, stride, padding) = (self.kernel.node_id(), self.stride, self.padding);
        let conv =
            x.derive(|g| g.new_conv_transpose2d_node(x.node_id(), kernel, stride, padding, None))?;
        conv.bias_add(&self.bias)
    }
}

impl Module for ConvTranspose2d {
    fn parameters(&self) -> Vec<Var> {
        vec![self.kernel.clone(), self.bias.clone()]
    }
}
