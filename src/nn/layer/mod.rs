/*
 * @Description  : Layer 模块 - 组合 Node 构建常见网络结构
 *
 * Layer 不是新的抽象层，只是持有参数 Var 的语法糖。
 * 参数以`{层名}/{参数名}`命名，如`discriminator/conv_1/kernel`
 */

mod batch_norm;
mod conv2d;
mod conv_transpose2d;
mod dropout;
mod linear;

pub use batch_norm::BatchNorm;
pub use conv_transpose2d::ConvTranspose2d;
pub use conv2d::Conv2d;
pub use dropout::Dropout;
pub use linear::Linear;
