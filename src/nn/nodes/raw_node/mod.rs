mod conv_utils;
mod input;
mod loss;
mod ops;
mod parameter;

pub(in crate::nn) use conv_utils::{ConvGeometry, matrix_view};
pub(in crate::nn) use input::Input;
pub(in crate::nn) use loss::*;
pub(in crate::nn) use ops::*;
pub use parameter::Init;
pub(in crate::nn) use parameter::Parameter;

use super::NodeHandle;
use crate::nn::GraphError;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
pub(in crate::nn) enum NodeType {
    Input(Input),
    Parameter(Parameter),
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓算子↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    Add(Add),
    BiasAdd(BiasAdd),
    MatMul(MatMul),
    ScalarMultiply(ScalarMultiply),
    LeakyReLU(LeakyReLU),
    Sigmoid(Sigmoid),
    Dropout(Dropout),
    BatchNorm(BatchNorm),
    Reshape(Reshape),
    ResizeBilinear(ResizeBilinear),
    Conv2d(Conv2d),
    ConvTranspose2d(ConvTranspose2d),
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑算子↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓损失↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    BceLoss(BceLoss),
    L2Penalty(L2Penalty),
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑损失↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    fn type_name(&self) -> &'static str;

    /// 建图时即确定的输出形状
    fn value_expected_shape(&self) -> &[usize];

    /// 根据父节点的值计算本节点的值。
    /// 该接口只在 Graph 中调用，调用前所有父节点的值都已在同一次前向传播中算好
    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<Tensor, GraphError>;

    /// 反向传播：给定结果节点对本节点输出的梯度`upstream_grad`，
    /// 计算结果节点对第`target_index`个父节点的梯度（形状与该父节点的值相同）
    fn calc_grad_to_parent(
        &self,
        target_index: usize,
        parents: &[&NodeHandle],
        value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError>;

    /// 是否允许从外部直接写入值（输入与参数节点）
    fn accepts_external_value(&self) -> bool {
        false
    }

    /// 切换训练/评估模式；只有 Dropout、BatchNorm 等节点关心
    fn set_training(&mut self, _training: bool) {}

    /// 是否允许前向传播更新滑动统计量；只有 BatchNorm 关心
    fn set_stat_updates(&mut self, _enabled: bool) {}

    /// 不参与梯度更新、但需要随参数一起保存的状态（如 BatchNorm 的滑动均值/方差）
    fn buffers(&self) -> Vec<(&'static str, &Tensor)> {
        Vec::new()
    }

    fn load_buffer(&mut self, key: &str, _value: &Tensor) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}节点没有名为{key}的缓冲状态",
            self.type_name()
        )))
    }

    fn descriptor(&self) -> NodeTypeDescriptor;
}

/// 取第`index`个父节点的值；前向传播保证父节点先于子节点计算，取不到说明 crate 代码有问题
pub(in crate::nn) fn parent_value<'a>(
    parents: &[&'a NodeHandle],
    index: usize,
) -> Result<&'a Tensor, GraphError> {
    let parent = parents.get(index).ok_or_else(|| {
        GraphError::ComputationError(format!("缺少第{index}个父节点。不该触及本错误，否则说明crate代码有问题"))
    })?;
    parent.value().ok_or_else(|| {
        GraphError::ComputationError(format!(
            "父节点{}没有值。不该触及本错误，否则说明crate代码有问题",
            parent
        ))
    })
}

/// 建图时检查父节点数量
pub(in crate::nn) fn check_parent_count(
    node_type: &str,
    parents: &[&NodeHandle],
    expected: usize,
) -> Result<(), GraphError> {
    if parents.len() != expected {
        return Err(GraphError::InvalidOperation(format!(
            "{node_type}节点需要{expected}个父节点，实际为{}个",
            parents.len()
        )));
    }
    Ok(())
}

/// 非法的梯度目标（父节点下标越界等）
pub(in crate::nn) fn invalid_grad_target(node_type: &str, target_index: usize) -> GraphError {
    GraphError::InvalidOperation(format!(
        "{node_type}节点没有第{target_index}个可求导的父节点"
    ))
}
