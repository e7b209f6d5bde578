use super::Tensor;
use crate::errors::TensorError;
use ndarray::Axis;

impl Tensor {
    /// 重塑形状，元素总数必须不变
    pub fn reshape(&self, shape: &[usize]) -> Self {
        let new_size: usize = shape.iter().product();
        if new_size != self.size() {
            panic!(
                "{}",
                TensorError::IncompatibleShape {
                    from: self.shape().to_vec(),
                    to: shape.to_vec(),
                }
            );
        }
        Self::from_vec(self.data_as_slice().to_vec(), shape)
    }

    /// 二维矩阵转置
    pub fn transpose(&self) -> Self {
        if self.dimension() != 2 {
            panic!(
                "{}",
                TensorError::DimensionMismatch {
                    expected: 2,
                    got: self.dimension(),
                }
            );
        }
        Self::from_array(self.data.t().to_owned())
    }

    /// 沿第 0 维（batch 维）按索引收集样本，组成新的批次
    pub fn select_batch(&self, indices: &[usize]) -> Self {
        let selected = self.data.select(Axis(0), indices);
        Self::from_array(selected)
    }
}
