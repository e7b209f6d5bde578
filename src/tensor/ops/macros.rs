/*
 * @Description  : 逐元素二元运算的公共实现。
 *                 对每种运算生成以下组合（均返回新张量）：
 *                 1. f32 与（不）带引用的张量；
 *                 2. （不）带引用的张量与 f32；
 *                 3. （不）带引用的张量与（不）带引用的张量，两者形状必须严格一致，否则 panic。
 */

macro_rules! impl_elementwise_op {
    ($trait:ident, $method:ident, $op:tt, $operator:expr) => {
        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓f32 与张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl std::ops::$trait<crate::tensor::Tensor> for f32 {
            type Output = crate::tensor::Tensor;

            fn $method(self, tensor: crate::tensor::Tensor) -> crate::tensor::Tensor {
                crate::tensor::Tensor::from_array(tensor.data.mapv(|x| self $op x))
            }
        }
        impl<'a> std::ops::$trait<&'a crate::tensor::Tensor> for f32 {
            type Output = crate::tensor::Tensor;

            fn $method(self, tensor: &'a crate::tensor::Tensor) -> crate::tensor::Tensor {
                crate::tensor::Tensor::from_array(tensor.data.mapv(|x| self $op x))
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑f32 与张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓张量与 f32↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl std::ops::$trait<f32> for crate::tensor::Tensor {
            type Output = Self;

            fn $method(self, scalar: f32) -> Self {
                Self::from_array(self.data.mapv(|x| x $op scalar))
            }
        }
        impl std::ops::$trait<f32> for &crate::tensor::Tensor {
            type Output = crate::tensor::Tensor;

            fn $method(self, scalar: f32) -> crate::tensor::Tensor {
                crate::tensor::Tensor::from_array(self.data.mapv(|x| x $op scalar))
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑张量与 f32↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓张量与张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl std::ops::$trait for crate::tensor::Tensor {
            type Output = Self;

            fn $method(self, other: Self) -> Self {
                &self $op &other
            }
        }
        impl<'a> std::ops::$trait<&'a crate::tensor::Tensor> for crate::tensor::Tensor {
            type Output = Self;

            fn $method(self, other: &'a Self) -> Self {
                &self $op other
            }
        }
        impl std::ops::$trait<crate::tensor::Tensor> for &crate::tensor::Tensor {
            type Output = crate::tensor::Tensor;

            fn $method(self, other: crate::tensor::Tensor) -> crate::tensor::Tensor {
                self $op &other
            }
        }
        impl<'b> std::ops::$trait<&'b crate::tensor::Tensor> for &crate::tensor::Tensor {
            type Output = crate::tensor::Tensor;

            fn $method(self, other: &'b crate::tensor::Tensor) -> crate::tensor::Tensor {
                self.assert_same_shape(other, $operator);
                crate::tensor::Tensor::from_array(&self.data $op &other.data)
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑张量与张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    };
}
