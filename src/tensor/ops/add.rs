/*
 * @Description  : 张量的加法，实现了两个张量“逐元素”（或张量与纯数）相加的运算，并返回一个新的张量。
 */

use crate::errors::Operator;

impl_elementwise_op!(Add, add, +, Operator::Add);
