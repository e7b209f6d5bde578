/*
 * @Description  : BatchSampler - 按 epoch 打乱的无限批次采样器
 *
 * 每个 epoch 开始时打乱一次样本顺序，然后顺序切出批次；
 * 一个 epoch 剩余的样本不够一个批次时，先取完剩余部分，
 * 重新打乱后再从新 epoch 的开头补足。因此每个批次的大小恒定。
 */

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::trace;

use super::datasets::MnistDataset;
use super::error::DataError;
use crate::tensor::Tensor;

/// 批次采样器，只保存索引，不持有数据集
///
/// # 示例
/// ```ignore
/// let mut sampler = BatchSampler::new(train.len(), Some(42));
/// for _ in 0..iterations {
///     let real = sampler.next_batch(&train, 64)?;
///     // ...
/// }
/// ```
pub struct BatchSampler {
    len: usize,
    order: Vec<usize>,
    position: usize,
    epochs_completed: usize,
    started: bool,
    rng: StdRng,
}

impl BatchSampler {
    /// 创建采样器；`seed`为 None 时从系统熵初始化
    pub fn new(len: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            len,
            order: (0..len).collect(),
            position: 0,
            epochs_completed: 0,
            started: false,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 已完整遍历的 epoch 数
    pub fn epochs_completed(&self) -> usize {
        self.epochs_completed
    }

    /// 取下一批样本索引
    pub fn next_indices(&mut self, batch_size: usize) -> Result<Vec<usize>, DataError> {
        if batch_size == 0 || batch_size > self.len {
            return Err(DataError::InvalidBatchSize {
                batch_size,
                len: self.len,
            });
        }

        if !self.started {
            self.order.shuffle(&mut self.rng);
            self.started = true;
        }

        let end = self.position + batch_size;
        if end <= self.len {
            let batch = self.order[self.position..end].to_vec();
            self.position = end;
            return Ok(batch);
        }

        // 本 epoch 剩余不足一个批次：取完剩余，重新打乱，从头补足
        let mut batch = self.order[self.position..].to_vec();
        self.epochs_completed += 1;
        self.order.shuffle(&mut self.rng);
        let remaining = batch_size - batch.len();
        batch.extend_from_slice(&self.order[..remaining]);
        self.position = remaining;
        trace!("第{}个 epoch 结束，重新打乱", self.epochs_completed);
        Ok(batch)
    }

    /// 取下一批图像 [batch_size, 1, 28, 28]
    pub fn next_batch(
        &mut self,
        dataset: &MnistDataset,
        batch_size: usize,
    ) -> Result<Tensor, DataError> {
        if dataset.len() != self.len {
            return Err(DataError::ShapeMismatch {
                expected: vec![self.len],
                got: vec![dataset.len()],
            });
        }
        let indices = self.next_indices(batch_size)?;
        Ok(dataset.images().select_batch(&indices))
    }
}
