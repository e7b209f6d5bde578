/*
 * @Description  : 批归一化（Batch Normalization）节点
 *
 * 父节点：
 * - parents[0]: 输入 [batch, C] 或 [batch, C, H, W]
 * - parents[1]: 偏移 beta [1, C]
 * - parents[2]: 缩放 gamma [1, C]（可选）
 *
 * 对除第 1 维（通道维）外的所有维度求均值与（有偏）方差。
 * 训练模式使用当前批次的统计量归一化，并以 momentum 更新滑动均值/方差：
 *   running = momentum * running + (1 - momentum) * batch_stat
 * 其中滑动方差使用无偏估计（乘以 m / (m - 1)，m 为每个通道的元素数）。
 * 关闭`update_stats`后，训练模式仍用批统计量，但不再改动滑动统计量。
 * 评估模式直接使用滑动统计量。
 */

use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{TraitNode, invalid_grad_target, parent_value};
use crate::tensor::Tensor;

pub(in crate::nn) struct BatchNorm {
    shape: Vec<usize>,
    channels: usize,
    momentum: f32,
    eps: f32,
    scale: bool,
    training: bool,
    update_stats: bool,
    running_mean: Tensor,
    running_var: Tensor,
    // 反向传播缓存
    x_hat: Option<Tensor>,
    inv_std: Vec<f32>,
    used_batch_stats: bool,
}

impl BatchNorm {
    pub(in crate::nn) const RUNNING_MEAN: &'static str = "moving_mean";
    pub(in crate::nn) const RUNNING_VAR: &'static str = "moving_variance";

    pub(in crate::nn) fn new(
        parents: &[&NodeHandle],
        momentum: f32,
        eps: f32,
        training: bool,
    ) -> Result<Self, GraphError> {
        if parents.len() != 2 && parents.len() != 3 {
            return Err(GraphError::InvalidOperation(format!(
                "BatchNorm节点需要2个（输入, beta）或3个（输入, beta, gamma）父节点，实际为{}个",
                parents.len()
            )));
        }
        let input_shape = parents[0].value_expected_shape();
        if input_shape.len() != 2 && input_shape.len() != 4 {
            return Err(GraphError::InvalidOperation(format!(
                "BatchNorm 的输入必须是 2D [batch, C] 或 4D [batch, C, H, W]，实际为 {input_shape:?}"
            )));
        }
        let channels = input_shape[1];
        for p in &parents[1..] {
            if p.value_expected_shape() != [1, channels] {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![1, channels],
                    got: p.value_expected_shape().to_vec(),
                    message: format!("BatchNorm 的{}形状必须为 [1, C]", p),
                });
            }
        }
        if !(0.0..1.0).contains(&momentum) || eps <= 0.0 {
            return Err(GraphError::InvalidOperation(format!(
                "BatchNorm 的 momentum 须在[0, 1)内且 eps 须为正，得到 momentum={momentum}, eps={eps}"
            )));
        }

        Ok(Self {
            shape: input_shape.to_vec(),
            channels,
            momentum,
            eps,
            scale: parents.len() == 3,
            training,
            update_stats: true,
            running_mean: Tensor::zeros(&[1, channels]),
            running_var: Tensor::ones(&[1, channels]),
            x_hat: None,
            inv_std: Vec::new(),
            used_batch_stats: false,
        })
    }

    fn spatial(&self) -> usize {
        self.shape[2..].iter().product()
    }

    /// 逐通道的均值与有偏方差
    fn batch_statistics(&self, x: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let spatial = self.spatial();
        let count = (x.len() / self.channels) as f32;
        let mut mean = vec![0.0f32; self.channels];
        let mut var = vec![0.0f32; self.channels];
        for (i, chunk) in x.chunks(spatial).enumerate() {
            mean[i % self.channels] += chunk.iter().sum::<f32>();
        }
        mean.iter_mut().for_each(|m| *m /= count);
        for (i, chunk) in x.chunks(spatial).enumerate() {
            let m = mean[i % self.channels];
            var[i % self.channels] += chunk.iter().map(|v| (v - m) * (v - m)).sum::<f32>();
        }
        var.iter_mut().for_each(|v| *v /= count);
        (mean, var)
    }

    /// 按通道对每个元素做变换：f(通道下标, 元素)
    fn per_channel<F: Fn(usize, f32) -> f32>(&self, x: &Tensor, f: F) -> Tensor {
        let spatial = self.spatial();
        let mut out = x.clone();
        for (i, chunk) in out.data_as_slice_mut().chunks_mut(spatial).enumerate() {
            let c = i % self.channels;
            chunk.iter_mut().for_each(|v| *v = f(c, *v));
        }
        out
    }

    fn gamma<'a>(&self, parents: &[&'a NodeHandle]) -> Result<Option<&'a [f32]>, GraphError> {
        if self.scale {
            Ok(Some(parent_value(parents, 2)?.data_as_slice()))
        } else {
            Ok(None)
        }
    }
}

impl TraitNode for BatchNorm {
    fn type_name(&self) -> &'static str {
        "BatchNorm"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError> {
        let x = parent_value(parents, 0)?;
        let beta = parent_value(parents, 1)?.data_as_slice();
        let gamma = self.gamma(parents)?;

        let (mean, var) = if self.training {
            let (mean, var) = self.batch_statistics(x.data_as_slice());
            if self.update_stats {
                let count = x.size() / self.channels;
                let bessel = if count > 1 {
                    count as f32 / (count - 1) as f32
                } else {
                    1.0
                };
                let m = self.momentum;
                for (c, (bm, bv)) in mean.iter().zip(var.iter()).enumerate() {
                    let rm = &mut self.running_mean[[0, c]];
                    *rm = m * *rm + (1.0 - m) * bm;
                    let rv = &mut self.running_var[[0, c]];
                    *rv = m * *rv + (1.0 - m) * bv * bessel;
                }
            }
            (mean, var)
        } else {
            (
                self.running_mean.data_as_slice().to_vec(),
                self.running_var.data_as_slice().to_vec(),
            )
        };

        let inv_std = var
            .iter()
            .map(|v| 1.0 / (v + self.eps).sqrt())
            .collect::<Vec<_>>();
        let x_hat = self.per_channel(x, |c, v| (v - mean[c]) * inv_std[c]);
        let output = self.per_channel(&x_hat, |c, v| {
            gamma.map_or(v, |g| g[c] * v) + beta[c]
        });

        self.x_hat = Some(x_hat);
        self.inv_std = inv_std;
        self.used_batch_stats = self.training;
        Ok(output)
    }

    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        parents: &[&NodeHandle],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let x_hat = self.x_hat.as_ref().ok_or_else(|| {
            GraphError::ComputationError("BatchNorm 尚未前向传播，无法计算梯度".to_string())
        })?;
        match target_index {
            0 => {
                let gamma = self.gamma(parents)?;
                let inv_std = &self.inv_std;
                // dL/dx_hat
                let dx_hat = self.per_channel(upstream_grad, |c, g| gamma.map_or(g, |gm| gm[c] * g));
                if !self.used_batch_stats {
                    return Ok(self.per_channel(&dx_hat, |c, g| g * inv_std[c]));
                }
                // 批统计量依赖于 x 本身：
                // dx = inv_std / m * (m * dx_hat - Σdx_hat - x_hat * Σ(dx_hat * x_hat))
                let count = (x_hat.size() / self.channels) as f32;
                let sum_dx_hat = dx_hat.channel_sums();
                let sum_dx_hat_x_hat = (&dx_hat * x_hat).channel_sums();
                let spatial = self.spatial();
                let mut dx = dx_hat;
                for (i, (chunk, xh_chunk)) in dx
                    .data_as_slice_mut()
                    .chunks_mut(spatial)
                    .zip(x_hat.data_as_slice().chunks(spatial))
                    .enumerate()
                {
                    let c = i % self.channels;
                    for (g, &xh) in chunk.iter_mut().zip(xh_chunk) {
                        *g = inv_std[c] / count
                            * (count * *g - sum_dx_hat[c] - xh * sum_dx_hat_x_hat[c]);
                    }
                }
                Ok(dx)
            }
            1 => Ok(Tensor::from_vec(
                upstream_grad.channel_sums(),
                &[1, self.channels],
            )),
            2 if self.scale => Ok(Tensor::from_vec(
                (upstream_grad * x_hat).channel_sums(),
                &[1, self.channels],
            )),
            _ => Err(invalid_grad_target(self.type_name(), target_index)),
        }
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn set_stat_updates(&mut self, enabled: bool) {
        self.update_stats = enabled;
    }

    fn buffers(&self) -> Vec<(&'static str, &Tensor)> {
        vec![
            (Self::RUNNING_MEAN, &self.running_mean),
            (Self::RUNNING_VAR, &self.running_var),
        ]
    }

    fn load_buffer(&mut self, key: &str, value: &Tensor) -> Result<(), GraphError> {
        let target = match key {
            Self::RUNNING_MEAN => &mut self.running_mean,
            Self::RUNNING_VAR => &mut self.running_var,
            _ => {
                return Err(GraphError::InvalidOperation(format!(
                    "BatchNorm节点没有名为{key}的缓冲状态"
                )));
            }
        };
        if value.shape() != target.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: target.shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("BatchNorm 的{key}形状不一致"),
            });
        }
        *target = value.clone();
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::BatchNorm {
            momentum: self.momentum,
            eps: self.eps,
            scale: self.scale,
        }
    }
}
