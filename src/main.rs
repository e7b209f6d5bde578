/*
 * @Description  : MNIST 手写数字 GAN 训练入口
 *
 * 没有命令行参数：工作目录下存在 gan_config.json 时读取它，否则使用默认配置。
 * 日志级别可通过 RUST_LOG 调整，如 `RUST_LOG=digit_gan=debug`。
 */

use digit_gan::data::MnistDataset;
use digit_gan::gan::{DEFAULT_CONFIG_FILE, GanConfig, GanError, GanTrainer};
use digit_gan::logger::{DEFAULT_LOG_FILTER, init_logger};
use tracing::{error, info};

fn main() {
    if let Err(e) = init_logger(DEFAULT_LOG_FILTER) {
        eprintln!("{e}");
    }
    if let Err(e) = run() {
        error!("训练失败: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GanError> {
    let config = GanConfig::load_or_default(DEFAULT_CONFIG_FILE)?;

    let (validation, train) = MnistDataset::load(config.data_dir.as_deref(), true, config.download)?
        .split_validation(config.validation_size)?;
    info!("训练集 {} 张，验证集 {} 张", train.len(), validation.len());

    let resume = config.resume;
    let mut trainer = GanTrainer::new(config)?;
    if resume && trainer.checkpoint().exists() {
        trainer.restore_checkpoint()?;
    }

    if let Some(last) = trainer.train(&train, Some(&validation))? {
        info!(
            "最后一次迭代: loss_d={:.4}, loss_g={:.4}",
            last.loss_d, last.loss_g
        );
    }
    trainer.save_checkpoint()
}
