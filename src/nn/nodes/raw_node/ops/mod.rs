mod add;
mod batch_norm;
mod bias_add;
mod conv2d;
mod conv_transpose2d;
mod dropout;
mod leaky_relu;
mod mat_mul;
mod reshape;
mod resize_bilinear;
mod scalar_multiply;
mod sigmoid;

pub(in crate::nn) use add::Add;
pub(in crate::nn) use batch_norm::BatchNorm;
pub(in crate::nn) use bias_add::BiasAdd;
pub(in crate::nn) use conv_transpose2d::ConvTranspose2d;
pub(in crate::nn) use conv2d::Conv2d;
pub(in crate::nn) use dropout::Dropout;
pub(in crate::nn) use leaky_relu::LeakyReLU;
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use reshape::Reshape;
pub(in crate::nn) use resize_bilinear::ResizeBilinear;
pub(in crate::nn) use scalar_multiply::ScalarMultiply;
pub(in crate::nn) use sigmoid::Sigmoid;
