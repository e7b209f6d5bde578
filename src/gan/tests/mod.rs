mod checkpoint;
mod sample;
mod trainer;

use std::path::Path;

use crate::gan::GanConfig;
use crate::tensor::Tensor;

/// 缩小后的网络，结构与默认配置相同
fn small_config(checkpoint_dir: &Path) -> GanConfig {
    GanConfig {
        iterations: 3,
        batch_size: 4,
        noise_dim: 8,
        filters: 4,
        dense_units: 8,
        checkpoint_every: 0,
        checkpoint_dir: checkpoint_dir.to_path_buf(),
        save_samples: false,
        seed: Some(7),
        download: false,
        ..GanConfig::default()
    }
}

/// 像素在 [0, 1) 内的伪随机“真实图像”
fn fake_real_batch(batch: usize, seed: u64) -> Tensor {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    Tensor::uniform_with_rng(0.0, 1.0, &[batch, 1, 28, 28], &mut rng)
}

fn values_of(vars: &[crate::nn::Var]) -> Vec<Tensor> {
    vars.iter().map(|v| v.value().unwrap().unwrap()).collect()
}
