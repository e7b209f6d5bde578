use super::{fake_real_batch, small_config, values_of};
use crate::gan::{Checkpoint, GanConfig, GanError, GanTrainer};
use crate::nn::Module;
use crate::tensor::Tensor;

#[test]
fn test_checkpoint_paths() {
    let checkpoint = Checkpoint::new("out", "model");
    assert_eq!(checkpoint.params_path(), std::path::Path::new("out/model.bin"));
    assert_eq!(checkpoint.graph_path(), std::path::Path::new("out/model.json"));
    assert_eq!(checkpoint.state_path(), std::path::Path::new("out/model.state"));
}

#[test]
fn test_save_then_restore_into_fresh_trainer() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = GanTrainer::new(small_config(dir.path())).unwrap();
    for seed in 0..2 {
        trainer.train_step(&fake_real_batch(4, seed)).unwrap();
    }
    trainer.save_checkpoint().unwrap();
    assert!(trainer.checkpoint().exists());

    // 不同种子 → 初始参数不同，恢复后必须一致
    let config = GanConfig {
        seed: Some(99),
        ..small_config(dir.path())
    };
    let mut restored = GanTrainer::new(config).unwrap();
    assert_ne!(
        values_of(&restored.generator().parameters()),
        values_of(&trainer.generator().parameters())
    );
    restored.restore_checkpoint().unwrap();

    assert_eq!(restored.iteration(), 2);
    assert_eq!(
        values_of(&restored.generator().parameters()),
        values_of(&trainer.generator().parameters())
    );
    assert_eq!(
        values_of(&restored.discriminator().parameters()),
        values_of(&trainer.discriminator().parameters())
    );
    assert_eq!(
        restored.training_state().unwrap(),
        trainer.training_state().unwrap()
    );

    // BatchNorm 滑动统计量也已恢复：评估模式下生成结果一致
    let noise = Tensor::full(0.5, &[4, 8]);
    assert_eq!(
        restored.generate(&noise).unwrap(),
        trainer.generate(&noise).unwrap()
    );
}

#[test]
fn test_save_samples_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let config = GanConfig {
        save_samples: true,
        ..small_config(dir.path())
    };
    let mut trainer = GanTrainer::new(config).unwrap();
    trainer.save_checkpoint().unwrap();

    let png = image::open(dir.path().join("digit_gan_samples.png")).unwrap();
    assert_eq!((png.width(), png.height()), (4 * 28, 28));
}

#[test]
fn test_restore_missing_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = GanTrainer::new(small_config(dir.path())).unwrap();
    assert!(matches!(
        trainer.restore_checkpoint(),
        Err(GanError::Checkpoint(_))
    ));
}

#[test]
fn test_restore_rejects_other_architecture() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = GanTrainer::new(small_config(dir.path())).unwrap();
    trainer.save_checkpoint().unwrap();

    let config = GanConfig {
        dense_units: 16,
        ..small_config(dir.path())
    };
    let mut other = GanTrainer::new(config).unwrap();
    assert!(matches!(other.restore_checkpoint(), Err(GanError::Graph(_))));
}
