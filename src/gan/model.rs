/*
 * @Description  : 生成器与判别器的网络结构
 *
 * 两个网络共用一张图：参数分别以`generator/`、`discriminator/`为前缀命名，
 * 判别器对真实图像和生成图像各调用一次`forward`，两次调用共享同一组参数。
 */

use crate::data::datasets::mnist::IMAGE_SIDE;
use crate::nn::{
    BatchNorm, Conv2d, ConvTranspose2d, Dropout, Graph, GraphError, Linear, Module, Padding, Var,
    VarActivationOps, VarShapeOps,
};

use super::config::GanConfig;

/// 生成器全连接层输出重塑成的特征图边长与通道数
const SEED_SIDE: usize = 4;
const SEED_CHANNELS: usize = 1;
/// 双线性放大后的边长，再经两次 stride 2 的转置卷积得到 28
const RESIZED_SIDE: usize = 7;

/// 转置卷积 → leaky ReLU → dropout → 批归一化
struct DeconvBlock {
    deconv: ConvTranspose2d,
    dropout: Dropout,
    norm: BatchNorm,
}

/// 生成器：噪声 [N, noise_dim] → 图像 [N, 1, 28, 28]，像素在 (0, 1) 内
pub struct Generator {
    dense: Linear,
    dense_dropout: Dropout,
    dense_norm: BatchNorm,
    blocks: Vec<DeconvBlock>,
    output: ConvTranspose2d,
    slope: f32,
}

impl Generator {
    pub fn new(graph: &Graph, config: &GanConfig) -> Result<Self, GraphError> {
        let k = (config.kernel_size, config.kernel_size);
        let (momentum, eps) = (config.batch_norm_momentum, config.batch_norm_eps);
        let dropout = Dropout::new(config.generator_dropout)?;
        let seed_units = SEED_SIDE * SEED_SIDE * SEED_CHANNELS;

        let dense = Linear::new(graph, config.noise_dim, seed_units, true, "generator/dense")?;
        let dense_norm = BatchNorm::new(graph, seed_units, momentum, eps, false, "generator/batch_norm")?;

        let mut blocks = Vec::with_capacity(3);
        let mut in_channels = SEED_CHANNELS;
        for (i, stride) in [2, 2, 1].into_iter().enumerate() {
            let deconv = ConvTranspose2d::new(
                graph,
                in_channels,
                config.filters,
                k,
                (stride, stride),
                Padding::Same,
                &format!("generator/conv2d_transpose_{}", i + 1),
            )?;
            let norm = BatchNorm::new(
                graph,
                config.filters,
                momentum,
                eps,
                false,
                &format!("generator/batch_norm_{}", i + 1),
            )?;
            blocks.push(DeconvBlock { deconv, dropout, norm });
            in_channels = config.filters;
        }

        let output = ConvTranspose2d::new(
            graph,
            config.filters,
            1,
            k,
            (1, 1),
            Padding::Same,
            "generator/conv2d_transpose_4",
        )?;

        Ok(Self {
            dense,
            dense_dropout: dropout,
            dense_norm,
            blocks,
            output,
            slope: config.leaky_relu_slope,
        })
    }

    pub fn forward(&self, noise: &Var) -> Result<Var, GraphError> {
        let batch = batch_size_of(noise)?;
        let x = self.dense.forward(noise)?.leaky_relu(self.slope)?;
        let x = self.dense_dropout.forward(&x)?;
        let x = self.dense_norm.forward(&x)?;
        let mut x = x
            .reshape(&[batch, SEED_CHANNELS, SEED_SIDE, SEED_SIDE])?
            .resize_bilinear((RESIZED_SIDE, RESIZED_SIDE))?;
        for block in &self.blocks {
            x = block.deconv.forward(&x)?.leaky_relu(self.slope)?;
            x = block.dropout.forward(&x)?;
            x = block.norm.forward(&x)?;
        }
        self.output.forward(&x)?.sigmoid()
    }
}

impl Module for Generator {
    fn parameters(&self) -> Vec<Var> {
        let mut params = self.dense.parameters();
        params.extend(self.dense_norm.parameters());
        for block in &self.blocks {
            params.extend(block.deconv.parameters());
            params.extend(block.norm.parameters());
        }
        params.extend(self.output.parameters());
        params
    }
}

/// 判别器：图像 [N, 1, 28, 28] → 为真实图像的概率 [N, 1]
pub struct Discriminator {
    convs: Vec<Conv2d>,
    dropout: Dropout,
    hidden: Linear,
    output: Linear,
    slope: f32,
}

impl Discriminator {
    pub fn new(graph: &Graph, config: &GanConfig) -> Result<Self, GraphError> {
        let k = (config.kernel_size, config.kernel_size);
        let mut convs = Vec::with_capacity(3);
        let mut in_channels = 1;
        let mut side = IMAGE_SIDE;
        for (i, stride) in [2, 1, 1].into_iter().enumerate() {
            convs.push(Conv2d::new(
                graph,
                in_channels,
                config.filters,
                k,
                (stride, stride),
                Padding::Same,
                &format!("discriminator/conv2d_{}", i + 1),
            )?);
            in_channels = config.filters;
            side = Padding::Same.conv_output_size(side, config.kernel_size, stride);
        }

        let flat = config.filters * side * side;
        let hidden = Linear::new(graph, flat, config.dense_units, true, "discriminator/dense_1")?;
        let output = Linear::new(graph, config.dense_units, 1, true, "discriminator/dense_2")?;

        Ok(Self {
            convs,
            dropout: Dropout::new(config.discriminator_dropout)?,
            hidden,
            output,
            slope: config.leaky_relu_slope,
        })
    }

    /// 每次调用都会新建一组计算节点，但参数共享
    pub fn forward(&self, images: &Var) -> Result<Var, GraphError> {
        let batch = batch_size_of(images)?;
        let mut x = images.reshape(&[batch, 1, IMAGE_SIDE, IMAGE_SIDE])?;
        for conv in &self.convs {
            x = conv.forward(&x)?.leaky_relu(self.slope)?;
            x = self.dropout.forward(&x)?;
        }
        let x = x.flatten()?;
        let x = self.hidden.forward(&x)?.leaky_relu(self.slope)?;
        self.output.forward(&x)?.sigmoid()
    }
}

impl Module for Discriminator {
    fn parameters(&self) -> Vec<Var> {
        let mut params: Vec<Var> = self.convs.iter().flat_map(Module::parameters).collect();
        params.extend(self.hidden.parameters());
        params.extend(self.output.parameters());
        params
    }
}

fn batch_size_of(x: &Var) -> Result<usize, GraphError> {
    x.value_expected_shape()?
        .first()
        .copied()
        .ok_or_else(|| GraphError::InvalidOperation(format!("{x:?}没有batch维")))
}
