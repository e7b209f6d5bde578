use approx::assert_abs_diff_eq;

use super::{fake_real_batch, small_config, values_of};
use crate::gan::{GanConfig, GanTrainer, update_decision};
use crate::nn::Module;
use crate::tensor::Tensor;

#[test]
fn test_update_decision() {
    let config = GanConfig::default();
    // 平衡时两者都更新
    assert_eq!(update_decision(0.7, 0.7, &config), (true, true));
    // 生成器损失过小：loss_g * 1.5 < loss_d
    assert_eq!(update_decision(1.6, 1.0, &config), (true, false));
    // 判别器损失过小：loss_d * 2 < loss_g
    assert_eq!(update_decision(0.4, 1.0, &config), (false, true));
    // 边界上不跳过
    assert_eq!(update_decision(1.5, 1.0, &config), (true, true));
    assert_eq!(update_decision(0.5, 1.0, &config), (true, true));
    // NaN 无法比较，不跳过任何一方
    assert_eq!(update_decision(f32::NAN, 1.0, &config), (true, true));
    assert_eq!(update_decision(0.7, f32::NAN, &config), (true, true));
}

#[test]
fn test_train_step_reports_consistent_losses() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = GanTrainer::new(small_config(dir.path())).unwrap();

    let report = trainer.train_step(&fake_real_batch(4, 0)).unwrap();
    assert_eq!(report.iteration, 0);
    assert_eq!(trainer.iteration(), 1);
    assert!(report.loss_d_real.is_finite() && report.loss_d_real > 0.0);
    assert!(report.loss_d_fake.is_finite() && report.loss_d_fake > 0.0);
    assert!(report.loss_g.is_finite() && report.loss_g > 0.0);
    assert_abs_diff_eq!(
        report.loss_d,
        0.5 * (report.loss_d_real + report.loss_d_fake),
        epsilon = 1e-5
    );
    // 正损失下两个网络不可能同时被跳过
    assert!(report.trained_d || report.trained_g);
}

#[test]
fn test_skipped_generator_keeps_its_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let config = GanConfig {
        g_skip_ratio: 0.0,
        d_skip_ratio: f32::INFINITY,
        ..small_config(dir.path())
    };
    let mut trainer = GanTrainer::new(config).unwrap();
    let g_before = values_of(&trainer.generator().parameters());
    let d_before = values_of(&trainer.discriminator().parameters());

    let report = trainer.train_step(&fake_real_batch(4, 1)).unwrap();
    assert!(report.trained_d);
    assert!(!report.trained_g);

    assert_eq!(values_of(&trainer.generator().parameters()), g_before);
    assert_ne!(values_of(&trainer.discriminator().parameters()), d_before);
}

#[test]
fn test_skipped_discriminator_keeps_its_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let config = GanConfig {
        d_skip_ratio: 0.0,
        g_skip_ratio: f32::INFINITY,
        ..small_config(dir.path())
    };
    let mut trainer = GanTrainer::new(config).unwrap();
    let g_before = values_of(&trainer.generator().parameters());
    let d_before = values_of(&trainer.discriminator().parameters());

    let report = trainer.train_step(&fake_real_batch(4, 2)).unwrap();
    assert!(!report.trained_d);
    assert!(report.trained_g);

    assert_eq!(values_of(&trainer.discriminator().parameters()), d_before);
    assert_ne!(values_of(&trainer.generator().parameters()), g_before);
}

#[test]
fn test_step_without_updates_keeps_batch_norm_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let config = GanConfig {
        g_skip_ratio: 0.0,
        d_skip_ratio: 0.0,
        ..small_config(dir.path())
    };
    let mut trainer = GanTrainer::new(config).unwrap();
    let noise = Tensor::full(0.25, &[4, 8]);
    let before = trainer.generate(&noise).unwrap();

    let report = trainer.train_step(&fake_real_batch(4, 4)).unwrap();
    assert!(!report.trained_d);
    assert!(!report.trained_g);

    // 读取损失的前向传播不更新滑动统计量，评估模式下输出不变
    assert_eq!(trainer.generate(&noise).unwrap(), before);
}

#[test]
fn test_sample_noise_is_uniform_unit_interval() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = GanTrainer::new(small_config(dir.path())).unwrap();
    let noise = trainer.sample_noise();
    assert_eq!(noise.shape(), &[4, 8]);
    assert!(noise.data_as_slice().iter().all(|&v| (0.0..1.0).contains(&v)));
    assert_ne!(noise, trainer.sample_noise());
}

#[test]
fn test_generate_is_deterministic_in_eval_mode() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = GanTrainer::new(small_config(dir.path())).unwrap();
    trainer.train_step(&fake_real_batch(4, 3)).unwrap();

    let noise = Tensor::full(0.25, &[4, 8]);
    let first = trainer.generate(&noise).unwrap();
    let second = trainer.generate(&noise).unwrap();
    assert_eq!(first.shape(), &[4, 1, 28, 28]);
    assert_eq!(first, second);
    // 生成后回到训练模式
    assert!(!trainer.graph().is_eval());
}

#[test]
fn test_generate_rejects_wrong_noise_shape() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = GanTrainer::new(small_config(dir.path())).unwrap();
    assert!(trainer.generate(&Tensor::zeros(&[4, 9])).is_err());
}

#[test]
fn test_train_step_rejects_wrong_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = GanTrainer::new(small_config(dir.path())).unwrap();
    assert!(trainer.train_step(&fake_real_batch(3, 0)).is_err());
}

#[test]
fn test_seeded_trainers_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = GanTrainer::new(small_config(dir.path())).unwrap();
    let mut b = GanTrainer::new(small_config(dir.path())).unwrap();
    let real = fake_real_batch(4, 9);
    for _ in 0..2 {
        assert_eq!(a.train_step(&real).unwrap(), b.train_step(&real).unwrap());
    }
}
