use crate::errors::Operator;
use crate::tensor::Tensor;
use std::ops::{AddAssign, MulAssign, SubAssign};

impl<'a> AddAssign<&'a Self> for Tensor {
    fn add_assign(&mut self, other: &'a Self) {
        self.assert_same_shape(other, Operator::AddAssign);
        self.data += &other.data;
    }
}

impl AddAssign<f32> for Tensor {
    fn add_assign(&mut self, scalar: f32) {
        self.data += scalar;
    }
}

impl<'a> SubAssign<&'a Self> for Tensor {
    fn sub_assign(&mut self, other: &'a Self) {
        self.assert_same_shape(other, Operator::SubAssign);
        self.data -= &other.data;
    }
}

impl<'a> MulAssign<&'a Self> for Tensor {
    fn mul_assign(&mut self, other: &'a Self) {
        self.assert_same_shape(other, Operator::MulAssign);
        self.data *= &other.data;
    }
}

impl MulAssign<f32> for Tensor {
    fn mul_assign(&mut self, scalar: f32) {
        self.data *= scalar;
    }
}
