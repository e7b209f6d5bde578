/*
 * @Description  : 张量的除法，实现了两个张量“逐元素”（或张量与纯数）相除的运算，并返回一个新的张量。
 *                 除数含零时按 IEEE 754 得到 inf/NaN，不做额外检查。
 */

use crate::errors::Operator;

impl_elementwise_op!(Div, div, /, Operator::Div);
