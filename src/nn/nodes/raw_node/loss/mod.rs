mod bce_loss;
mod l2_penalty;

pub(in crate::nn) use bce_loss::BceLoss;
pub(in crate::nn) use l2_penalty::L2Penalty;
