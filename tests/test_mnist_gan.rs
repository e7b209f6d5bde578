/*
 * @Description  : GAN 训练集成测试
 *                 验证：完整的建图 → 训练循环 → 检查点 → 恢复训练
 *                 使用合成的“竖线数字”代替 MNIST，不依赖网络
 */

use digit_gan::data::MnistDataset;
use digit_gan::gan::{GanConfig, GanError, GanTrainer};
use digit_gan::tensor::Tensor;
use std::path::Path;
use std::time::Instant;

/// 第 i 张图在第 4 + i % 20 列画一条竖线
fn synthetic_digits(count: usize) -> MnistDataset {
    let mut data = vec![0.0f32; count * 28 * 28];
    for i in 0..count {
        let column = 4 + i % 20;
        for row in 4..24 {
            data[i * 784 + row * 28 + column] = 1.0;
        }
    }
    let labels = (0..count).map(|i| (i % 10) as u8).collect();
    MnistDataset::from_parts(Tensor::from_vec(data, &[count, 1, 28, 28]), labels)
        .expect("合成数据集形状错误")
}

fn small_config(dir: &Path, iterations: usize) -> GanConfig {
    GanConfig {
        iterations,
        batch_size: 8,
        noise_dim: 16,
        filters: 4,
        dense_units: 16,
        checkpoint_every: 2,
        checkpoint_dir: dir.to_path_buf(),
        checkpoint_name: "synthetic".to_string(),
        save_samples: true,
        validation_size: 8,
        seed: Some(42),
        download: false,
        ..GanConfig::default()
    }
}

#[test]
fn test_gan_training_and_resume() -> Result<(), GanError> {
    let start_time = Instant::now();
    let dir = tempfile::tempdir()?;

    let (validation, train) = synthetic_digits(40).split_validation(8)?;
    assert_eq!(train.len(), 32);

    // ========== 1. 训练 5 次迭代 ==========
    let mut trainer = GanTrainer::new(small_config(dir.path(), 5))?;
    let last = trainer.train(&train, Some(&validation))?.expect("至少应有一次迭代");
    assert_eq!(last.iteration, 4);
    assert_eq!(trainer.iteration(), 5);
    assert!(last.loss_d.is_finite() && last.loss_g.is_finite());

    // 第 0、2、4 次迭代后都保存过检查点
    let checkpoint = trainer.checkpoint().clone();
    assert!(checkpoint.exists());
    assert!(dir.path().join("synthetic_samples.png").exists());

    let saved_state = trainer.training_state()?;
    assert_eq!(saved_state.iteration, 5);

    let noise = Tensor::full(0.5, &[8, 16]);
    let before = trainer.generate(&noise)?;
    assert_eq!(before.shape(), &[8, 1, 28, 28]);

    // ========== 2. 新建训练器并从检查点继续 ==========
    let mut resumed = GanTrainer::new(small_config(dir.path(), 7))?;
    resumed.restore_checkpoint()?;
    assert_eq!(resumed.iteration(), 5);
    assert_eq!(resumed.generate(&noise)?, before);

    let last = resumed.train(&train, None)?.expect("恢复后应继续迭代");
    assert_eq!(last.iteration, 6);
    assert_eq!(resumed.iteration(), 7);

    // 已训练到目标次数时不再迭代
    assert!(resumed.train(&train, None)?.is_none());

    println!("集成测试耗时 {:.2}s", start_time.elapsed().as_secs_f32());
    Ok(())
}

/// 需要网络与较长时间：在真实 MNIST 上训练几十次迭代
#[test]
#[ignore]
fn test_gan_on_mnist() -> Result<(), GanError> {
    let dir = tempfile::tempdir()?;
    let (validation, train) = MnistDataset::train()?.split_validation(5000)?;
    assert_eq!(train.len(), 55000);

    let config = GanConfig {
        iterations: 20,
        checkpoint_every: 10,
        checkpoint_dir: dir.path().to_path_buf(),
        seed: Some(0),
        ..GanConfig::default()
    };
    let mut trainer = GanTrainer::new(config)?;
    let last = trainer.train(&train, Some(&validation))?.expect("至少应有一次迭代");
    println!("loss_d={:.4}, loss_g={:.4}", last.loss_d, last.loss_g);
    assert!(last.loss_d.is_finite() && last.loss_g.is_finite());
    Ok(())
}
