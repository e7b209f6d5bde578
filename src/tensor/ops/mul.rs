/*
 * @Description  : 张量的乘法，实现了两个张量“逐元素”（或张量与纯数）相乘的运算，并返回一个新的张量。
 *                 注意：这里不是矩阵乘法，矩阵乘法请用`mat_mul`。
 */

use crate::errors::Operator;

impl_elementwise_op!(Mul, mul, *, Operator::Mul);
