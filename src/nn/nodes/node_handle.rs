use super::raw_node::{NodeType, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;
use std::fmt;

/// 节点句柄：图中每个节点的外壳。
/// 节点的值、梯度以及拓扑信息都保存在这里，具体的运算逻辑则交给`raw_node`。
pub struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    parents: Vec<NodeId>,
    value: Option<Tensor>,
    grad: Option<Tensor>,
    /// 最近一次计算本节点值时所处的前向传播批次，用于避免同一批次内重复计算
    last_forward_pass_id: u64,
}

impl NodeHandle {
    pub(in crate::nn) fn new<T: Into<NodeType>>(
        id: NodeId,
        name: &str,
        raw_node: T,
        parents: Vec<NodeId>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            raw_node: raw_node.into(),
            parents,
            value: None,
            grad: None,
            last_forward_pass_id: 0,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents_ids(&self) -> &[NodeId] {
        &self.parents
    }

    pub(in crate::nn) fn raw_node(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn raw_node_mut(&mut self) -> &mut NodeType {
        &mut self.raw_node
    }

    /// 节点值的预期形状（建图时即确定）
    pub fn value_expected_shape(&self) -> &[usize] {
        self.raw_node.value_expected_shape()
    }

    pub fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    /// 直接设置节点的值，仅输入节点与参数节点允许调用
    pub(in crate::nn) fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        if !self.raw_node.accepts_external_value() {
            return Err(GraphError::InvalidOperation(format!(
                "{}的值只能由前向传播计算得到，不能手动设置",
                self
            )));
        }
        if let Some(v) = value {
            self.check_shape(v)?;
        }
        self.value = value.cloned();
        Ok(())
    }

    pub(in crate::nn) fn set_computed_value(&mut self, value: Tensor, pass_id: u64) {
        self.value = Some(value);
        self.last_forward_pass_id = pass_id;
    }

    pub(in crate::nn) fn last_forward_pass_id(&self) -> u64 {
        self.last_forward_pass_id
    }

    pub(in crate::nn) fn set_last_forward_pass_id(&mut self, pass_id: u64) {
        self.last_forward_pass_id = pass_id;
    }

    pub fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    pub(in crate::nn) fn set_grad(&mut self, grad: Option<Tensor>) {
        self.grad = grad;
    }

    /// 累加梯度：没有旧梯度时直接写入
    pub(in crate::nn) fn accumulate_grad(&mut self, grad: &Tensor) {
        match self.grad.as_mut() {
            Some(old) => *old += grad,
            None => self.grad = Some(grad.clone()),
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.raw_node, NodeType::Parameter(_))
    }

    pub fn is_input(&self) -> bool {
        matches!(self.raw_node, NodeType::Input(_))
    }

    pub fn type_name(&self) -> &'static str {
        self.raw_node.type_name()
    }

    fn check_shape(&self, value: &Tensor) -> Result<(), GraphError> {
        if value.shape() != self.value_expected_shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value_expected_shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("{}的新值形状与节点形状不一致", self),
            });
        }
        Ok(())
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "节点[id={}, name={}, type={}]", self.id.0, self.name, self.type_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);
