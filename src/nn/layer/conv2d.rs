/*
 * @Description  : Conv2d (2D 卷积) 层
 */

use crate::nn::Padding;
use crate::nn::{Graph, GraphError, Init, Module, Var, VarMatrixOps};

/// Conv2d 层
///
/// # 输入/输出形状
/// - 输入：[batch, in_channels, H, W]
/// - 输出：[batch, out_channels, H', W']（Same 填充时 H' = ceil(H / stride)）
///
/// # 使用示例
/// ```ignore
/// let conv = Conv2d::new(&graph, 1, 64, (5, 5), (2, 2), Padding::Same, "conv_1")?;
/// let h = conv.forward(&x)?.leaky_relu(0.2)?;
/// ```
#[derive(Debug)]
pub struct Conv2d {
    /// 卷积核 [out_channels, in_channels, kH, kW]
    kernel: Var,
    /// 偏置 [1, out_channels]
    bias: Var,
    stride: (usize, usize),
    padding: Padding,
}

impl Conv2d {
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
        let kernel = graph.parameter(
            &[out_channels, in_channels, kh, kw],
            Init::GlorotUniform {
                fan_in: kh * kw * in_channels,
                fan_out: kh * kw * out_channels,
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
        x.check_same_graph(&self.kernel, "卷积")?;
        let (kernel, stride, padding) = (self.kernel.node_id(), self.stride, self.padding);
        let conv = x.derive(|g| g.new_conv2d_node(x.node_id(), kernel, stride, padding, None))?;
        conv.bias_add(&self.bias)
    }

    pub const fn kernel(&self) -> &Var {
        &self.kernel
    }
}

impl Module for Conv2d {
    fn parameters(&self) -> Vec<Var> {
        vec![self.kernel.clone(), self.bias.clone()]
    }
}
