/*
 * @Description  : Var 扩展 trait 模块
 *
 * 按功能领域组织 Var 的扩展方法，用户按需 import。
 *
 * # 模块结构
 * - `activation`: 激活与正则（sigmoid, leaky_relu, dropout）
 * - `loss`: 损失函数（bce_loss）
 * - `matrix`: 矩阵运算（matmul, bias_add, scale）
 * - `shape`: 形状变换（reshape, flatten, resize_bilinear）
 *
 * # 使用示例
 * ```ignore
 * use digit_gan::nn::{VarActivationOps, VarLossOps, VarMatrixOps, VarShapeOps};
 *
 * let h = x.flatten()?.matmul(&w)?.bias_add(&b)?.leaky_relu(0.2)?;
 * let loss = h.sigmoid()?.bce_loss(1.0)?;
 * ```
 */

mod activation;
mod loss;
mod matrix;
mod shape;

pub use activation::VarActivationOps;
pub use loss::VarLossOps;
pub use matrix::VarMatrixOps;
pub use shape::VarShapeOps;
