use super::Tensor;
use std::ops::{Index, IndexMut};

// 支持 `tensor[[i, j]]`、`tensor[[b, c, h, w]]` 这类定长下标访问
impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; N]) -> &f32 {
        &self.data[&index[..]]
    }
}

impl<const N: usize> IndexMut<[usize; N]> for Tensor {
    fn index_mut(&mut self, index: [usize; N]) -> &mut f32 {
        &mut self.data[&index[..]]
    }
}
