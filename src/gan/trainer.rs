/*
 * @Description  : GAN 训练器
 *
 * 建图：
 *   noise ─▶ Generator ─▶ fake ─▶ Discriminator ─▶ d_fake
 *   real  ───────────────────────▶ Discriminator ─▶ d_real   （两次调用共享参数）
 *
 * 每次迭代：
 * 1. 采样噪声与一批真实图像，训练模式下一次前向算出四个损失（不更新 BatchNorm 滑动统计量）；
 * 2. `loss_g * 1.5 < loss_d` 时跳过生成器，`loss_d * 2 < loss_g` 时跳过判别器；
 * 3. 先更新判别器再更新生成器，各自重新做一次前向传播，且只更新自己的参数；
 *    滑动统计量只在这两次前向传播中更新，两个网络都跳过时保持不变。
 */

use std::cmp::Ordering;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::checkpoint::{Checkpoint, TrainingState};
use super::config::GanConfig;
use super::error::GanError;
use super::model::{Discriminator, Generator};
use super::sample::save_sample_grid;
use crate::data::datasets::mnist::IMAGE_SIDE;
use crate::data::{BatchSampler, MnistDataset};
use crate::nn::{Graph, GraphError, Module, Optimizer, RMSProp, Var, VarLossOps, VarMatrixOps};
use crate::tensor::Tensor;

/// 单次迭代的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// 迭代序号（从 0 开始）
    pub iteration: usize,
    pub loss_d_real: f32,
    pub loss_d_fake: f32,
    pub loss_d: f32,
    pub loss_g: f32,
    pub trained_d: bool,
    pub trained_g: bool,
}

/// 由当前损失决定两个网络是否更新，返回 (更新判别器, 更新生成器)
///
/// 只有比较明确成立时才跳过，损失为 NaN 时两个网络照常更新
pub fn update_decision(loss_d: f32, loss_g: f32, config: &GanConfig) -> (bool, bool) {
    let train_g = (loss_g * config.g_skip_ratio).partial_cmp(&loss_d) != Some(Ordering::Less);
    let train_d = (loss_d * config.d_skip_ratio).partial_cmp(&loss_g) != Some(Ordering::Less);
    (train_d, train_g)
}

pub struct GanTrainer {
    config: GanConfig,
    graph: Graph,
    generator: Generator,
    discriminator: Discriminator,
    real_input: Var,
    noise_input: Var,
    fake: Var,
    d_real: Var,
    loss_d_real: Var,
    loss_d_fake: Var,
    loss_d: Var,
    loss_g: Var,
    d_objective: Var,
    g_objective: Var,
    optimizer_d: RMSProp,
    optimizer_g: RMSProp,
    noise_rng: StdRng,
    /// 保存样本图时固定使用的噪声，便于比较不同阶段的生成效果
    preview_noise: Tensor,
    checkpoint: Checkpoint,
    /// 已完成的迭代次数
    iteration: usize,
}

impl GanTrainer {
    pub fn new(config: GanConfig) -> Result<Self, GanError> {
        config.validate()?;
        let graph = Graph::with_name_and_seed("digit_gan", config.seed);

        let (batch, noise_dim) = (config.batch_size, config.noise_dim);
        let real_input = graph.input_shape(&[batch, 1, IMAGE_SIDE, IMAGE_SIDE], Some("real_images"))?;
        let noise_input = graph.input_shape(&[batch, noise_dim], Some("noise"))?;

        let generator = Generator::new(&graph, &config)?;
        let discriminator = Discriminator::new(&graph, &config)?;

        let fake = generator.forward(&noise_input)?;
        let d_real = discriminator.forward(&real_input)?;
        let d_fake = discriminator.forward(&fake)?;

        let loss_d_real = d_real.bce_loss(1.0)?;
        let loss_d_fake = d_fake.bce_loss(0.0)?;
        let loss_g = d_fake.bce_loss(1.0)?;
        let loss_d = loss_d_real.try_add(&loss_d_fake)?.scale(0.5)?;

        let d_params = discriminator.parameters();
        let g_params = generator.parameters();
        let d_objective = loss_d.try_add(&graph.l2_penalty(&d_params, config.l2_scale)?)?;
        let g_objective = loss_g.try_add(&graph.l2_penalty(&g_params, config.l2_scale)?)?;

        let optimizer_d = RMSProp::new(&graph, &d_params, config.learning_rate);
        let optimizer_g = RMSProp::new(&graph, &g_params, config.learning_rate);

        let mut noise_rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let preview_noise = Tensor::uniform_with_rng(0.0, 1.0, &[batch, noise_dim], &mut noise_rng);
        let checkpoint = Checkpoint::new(&config.checkpoint_dir, &config.checkpoint_name);

        info!(
            "已构建 GAN：生成器 {} 个参数，判别器 {} 个参数",
            generator.num_scalars(),
            discriminator.num_scalars()
        );
        debug!("{}", graph.summary());

        Ok(Self {
            config,
            graph,
            generator,
            discriminator,
            real_input,
            noise_input,
            fake,
            d_real,
            loss_d_real,
            loss_d_fake,
            loss_d,
            loss_g,
            d_objective,
            g_objective,
            optimizer_d,
            optimizer_g,
            noise_rng,
            preview_noise,
            checkpoint,
            iteration: 0,
        })
    }

    pub fn config(&self) -> &GanConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    /// 已完成的迭代次数
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// 采样 [batch, noise_dim]、服从 [0, 1) 均匀分布的噪声
    pub fn sample_noise(&mut self) -> Tensor {
        Tensor::uniform_with_rng(
            0.0,
            1.0,
            &[self.config.batch_size, self.config.noise_dim],
            &mut self.noise_rng,
        )
    }

    /// 用给定的真实图像 [batch, 1, 28, 28] 训练一次
    pub fn train_step(&mut self, real: &Tensor) -> Result<IterationReport, GanError> {
        let noise = self.sample_noise();
        self.real_input.set_value(real)?;
        self.noise_input.set_value(&noise)?;
        self.graph.train();

        self.graph.forward_many_frozen(&[
            &self.loss_d_real,
            &self.loss_d_fake,
            &self.loss_d,
            &self.loss_g,
        ])?;
        let loss_d_real = self.loss_d_real.item()?;
        let loss_d_fake = self.loss_d_fake.item()?;
        let loss_d = self.loss_d.item()?;
        let loss_g = self.loss_g.item()?;

        if !(loss_d.is_finite() && loss_g.is_finite()) {
            warn!(
                "第{}次迭代出现非有限损失：loss_d={loss_d}, loss_g={loss_g}",
                self.iteration
            );
        }

        let (trained_d, trained_g) = update_decision(loss_d, loss_g, &self.config);
        if trained_d {
            self.optimizer_d.minimize(&self.d_objective)?;
        }
        if trained_g {
            self.optimizer_g.minimize(&self.g_objective)?;
        }

        let report = IterationReport {
            iteration: self.iteration,
            loss_d_real,
            loss_d_fake,
            loss_d,
            loss_g,
            trained_d,
            trained_g,
        };
        debug!(
            "迭代 {}: loss_d_real={:.4}, loss_d_fake={:.4}, loss_d={:.4}, loss_g={:.4}, 更新D={}, 更新G={}",
            report.iteration,
            loss_d_real,
            loss_d_fake,
            loss_d,
            loss_g,
            trained_d,
            trained_g
        );
        self.iteration += 1;
        Ok(report)
    }

    /// 从当前进度训练到`config.iterations`，返回最后一次迭代的结果
    ///
    /// `validation`提供时，每次保存检查点都会报告判别器在验证集上的平均打分
    pub fn train(
        &mut self,
        train_set: &MnistDataset,
        validation: Option<&MnistDataset>,
    ) -> Result<Option<IterationReport>, GanError> {
        let mut sampler = BatchSampler::new(train_set.len(), self.config.seed);
        let mut validation_sampler = validation.map(|v| BatchSampler::new(v.len(), self.config.seed));
        let mut last = None;

        info!(
            "开始训练：第{}次到第{}次迭代，批次大小 {}",
            self.iteration, self.config.iterations, self.config.batch_size
        );
        while self.iteration < self.config.iterations {
            let real = sampler.next_batch(train_set, self.config.batch_size)?;
            let report = self.train_step(&real)?;

            let every = self.config.checkpoint_every;
            if every > 0 && report.iteration % every == 0 {
                info!(
                    "迭代 {}: loss_d={:.4}, loss_g={:.4}",
                    report.iteration, report.loss_d, report.loss_g
                );
                self.save_checkpoint()?;
                if let (Some(set), Some(val_sampler)) = (validation, validation_sampler.as_mut()) {
                    if set.len() >= self.config.batch_size {
                        let images = val_sampler.next_batch(set, self.config.batch_size)?;
                        let score = self.discriminate(&images)?;
                        info!("判别器对验证集真实图像的平均打分: {score:.4}");
                    }
                }
            }
            last = Some(report);
        }
        info!("训练结束，共完成{}次迭代", self.iteration);
        Ok(last)
    }

    /// 评估模式下由噪声 [batch, noise_dim] 生成图像 [batch, 1, 28, 28]
    pub fn generate(&mut self, noise: &Tensor) -> Result<Tensor, GanError> {
        self.noise_input.set_value(noise)?;
        self.graph.eval();
        let result = self.graph.forward(&self.fake).and_then(|()| self.fake.value());
        self.graph.train();
        let images =
            result?.ok_or_else(|| GraphError::ComputationError("生成器没有输出".to_string()))?;
        Ok(images)
    }

    /// 评估模式下判别器对一批图像的平均打分（越接近 1 越“真”）
    pub fn discriminate(&mut self, images: &Tensor) -> Result<f32, GanError> {
        self.real_input.set_value(images)?;
        self.graph.eval();
        let result = self.graph.forward(&self.d_real).and_then(|()| self.d_real.value());
        self.graph.train();
        let scores =
            result?.ok_or_else(|| GraphError::ComputationError("判别器没有输出".to_string()))?;
        Ok(scores.mean())
    }

    pub fn training_state(&self) -> Result<TrainingState, GanError> {
        Ok(TrainingState {
            iteration: self.iteration,
            discriminator: self.optimizer_d.state()?,
            generator: self.optimizer_g.state()?,
        })
    }

    /// 保存检查点；开启`save_samples`时同时输出`{name}_samples.png`
    pub fn save_checkpoint(&mut self) -> Result<(), GanError> {
        self.checkpoint.save(&self.graph, &self.training_state()?)?;
        if self.config.save_samples {
            let preview_noise = self.preview_noise.clone();
            let images = self.generate(&preview_noise)?;
            let path = self
                .config
                .checkpoint_dir
                .join(format!("{}_samples.png", self.config.checkpoint_name));
            save_sample_grid(&images, &path)?;
            debug!("已保存样本图 {}", path.display());
        }
        Ok(())
    }

    /// 从检查点恢复参数、BatchNorm 统计量、优化器状态与迭代进度
    pub fn restore_checkpoint(&mut self) -> Result<(), GanError> {
        let state = self.checkpoint.restore(&self.graph)?;
        self.optimizer_d.load_state(&state.discriminator)?;
        self.optimizer_g.load_state(&state.generator)?;
        self.iteration = state.iteration;
        Ok(())
    }
}
