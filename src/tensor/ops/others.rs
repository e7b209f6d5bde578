use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::{ArrayView2, Ix2};

impl Tensor {
    /// 所有元素之和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 所有元素的均值；空张量返回 0
    pub fn mean(&self) -> f32 {
        if self.size() == 0 {
            return 0.0;
        }
        self.sum() / self.size() as f32
    }

    /// 逐元素开方
    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    /// 逐元素平方
    pub fn square(&self) -> Self {
        self.map(|x| x * x)
    }

    /// 逐元素映射，返回新张量
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Self {
        Self::from_array(self.data.mapv(f))
    }

    /// 两个张量逐元素组合，形状必须一致
    pub fn zip_map<F: Fn(f32, f32) -> f32>(&self, other: &Self, f: F) -> Self {
        self.assert_same_shape(other, Operator::Mul);
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect::<Vec<_>>();
        Self::from_vec(data, self.shape())
    }

    /// 二维矩阵乘法：[m, k] x [k, n] -> [m, n]
    pub fn mat_mul(&self, other: &Self) -> Self {
        let a = self.as_matrix();
        let b = other.as_matrix();
        if a.ncols() != b.nrows() {
            panic!(
                "{}",
                TensorError::OperatorError {
                    operator: Operator::MatMul,
                    tensor1_shape: self.shape().to_vec(),
                    tensor2_shape: other.shape().to_vec(),
                }
            );
        }
        Self::from_array(a.dot(&b).into_dyn())
    }

    /// 对除第 1 维（通道维）外的所有维度求和，返回长度为通道数的向量。
    /// 用于 [batch, c] 与 [batch, c, h, w] 两类张量的逐通道归约。
    pub fn channel_sums(&self) -> Vec<f32> {
        let shape = self.shape();
        assert!(
            shape.len() >= 2,
            "{}",
            TensorError::DimensionMismatch {
                expected: 2,
                got: shape.len(),
            }
        );
        let (batch, channels) = (shape[0], shape[1]);
        let spatial: usize = shape[2..].iter().product();
        let data = self.data_as_slice();

        let mut sums = vec![0.0f32; channels];
        for b in 0..batch {
            for (c, sum) in sums.iter_mut().enumerate() {
                let start = (b * channels + c) * spatial;
                *sum += data[start..start + spatial].iter().sum::<f32>();
            }
        }
        sums
    }

    fn as_matrix(&self) -> ArrayView2<'_, f32> {
        match self.data.view().into_dimensionality::<Ix2>() {
            Ok(view) => view,
            Err(_) => panic!(
                "{}",
                TensorError::DimensionMismatch {
                    expected: 2,
                    got: self.dimension(),
                }
            ),
        }
    }
}
