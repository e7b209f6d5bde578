/*
 * @Description  : GAN 训练配置
 *
 * 所有字段都有默认值；JSON 中缺省的字段使用默认值，因此配置文件只需写要改的项。
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::GanError;

/// 默认配置文件名（位于工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "gan_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanConfig {
    /// 训练迭代次数
    pub iterations: usize,
    pub batch_size: usize,
    /// 噪声向量维度
    pub noise_dim: usize,
    pub learning_rate: f32,
    /// 生成器的 dropout 丢弃概率（= 1 - keep_prob）
    ///
    /// 默认 0.4 对应 keep_prob 0.6。dropout 只在训练模式下生效；
    /// 设为 0 时 dropout 层是恒等映射，训练结果与完全不使用 dropout 的网络一致
    pub generator_dropout: f32,
    /// 判别器的 dropout 丢弃概率，默认 0.2 对应 keep_prob 0.8；设为 0 即关闭
    pub discriminator_dropout: f32,
    /// 卷积/转置卷积的通道数
    pub filters: usize,
    /// 判别器隐藏全连接层的单元数
    pub dense_units: usize,
    pub kernel_size: usize,
    pub leaky_relu_slope: f32,
    /// L2 正则系数
    pub l2_scale: f32,
    pub batch_norm_momentum: f32,
    pub batch_norm_eps: f32,
    /// `loss_g * g_skip_ratio < loss_d` 时跳过生成器更新
    pub g_skip_ratio: f32,
    /// `loss_d * d_skip_ratio < loss_g` 时跳过判别器更新
    pub d_skip_ratio: f32,
    /// 每隔多少次迭代保存一次检查点（0 表示不保存）
    pub checkpoint_every: usize,
    pub checkpoint_dir: PathBuf,
    /// 检查点文件名（不含扩展名）
    pub checkpoint_name: String,
    /// 保存检查点时是否顺带输出一张生成样本图
    pub save_samples: bool,
    /// 从训练集开头划出的验证集大小
    pub validation_size: usize,
    /// 随机种子；None 时每次运行都不同
    pub seed: Option<u64>,
    /// MNIST 数据目录；None 时使用缓存目录
    pub data_dir: Option<PathBuf>,
    /// 本地缺少数据文件时是否自动下载
    pub download: bool,
    /// 启动时若检查点存在则从中恢复
    pub resume: bool,
}

impl Default for GanConfig {
    fn default() -> Self {
        Self {
            iterations: 60000,
            batch_size: 64,
            noise_dim: 64,
            learning_rate: 0.00015,
            generator_dropout: 0.4,
            discriminator_dropout: 0.2,
            filters: 64,
            dense_units: 128,
            kernel_size: 5,
            leaky_relu_slope: 0.2,
            l2_scale: 1e-6,
            batch_norm_momentum: 0.99,
            batch_norm_eps: 1e-3,
            g_skip_ratio: 1.5,
            d_skip_ratio: 2.0,
            checkpoint_every: 200,
            checkpoint_dir: PathBuf::from("."),
            checkpoint_name: "digit_gan".to_string(),
            save_samples: true,
            validation_size: 5000,
            seed: None,
            data_dir: None,
            download: true,
            resume: false,
        }
    }
}

impl GanConfig {
    pub fn from_json(json: &str) -> Result<Self, GanError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GanError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// 文件存在则读取，否则使用默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, GanError> {
        let path = path.as_ref();
        if path.exists() {
            info!("读取配置文件 {}", path.display());
            Self::load(path)
        } else {
            info!("未找到配置文件 {}，使用默认配置", path.display());
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GanError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// 检查点的基础路径 `{checkpoint_dir}/{checkpoint_name}`
    pub fn checkpoint_path(&self) -> PathBuf {
        self.checkpoint_dir.join(&self.checkpoint_name)
    }

    pub fn validate(&self) -> Result<(), GanError> {
        let positive = [
            ("iterations", self.iterations),
            ("batch_size", self.batch_size),
            ("noise_dim", self.noise_dim),
            ("filters", self.filters),
            ("dense_units", self.dense_units),
            ("kernel_size", self.kernel_size),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(GanError::Config(format!("{field}必须大于0")));
        }
        for (field, rate) in [
            ("generator_dropout", self.generator_dropout),
            ("discriminator_dropout", self.discriminator_dropout),
        ] {
            if !(0.0..1.0).contains(&rate) {
                return Err(GanError::Config(format!(
                    "{field}必须在[0, 1)内，但得到: {rate}"
                )));
            }
        }
        if self.learning_rate <= 0.0 {
            return Err(GanError::Config(format!(
                "learning_rate必须为正数，但得到: {}",
                self.learning_rate
            )));
        }
        if self.checkpoint_name.is_empty() {
            return Err(GanError::Config("checkpoint_name不能为空".to_string()));
        }
        Ok(())
    }
}
