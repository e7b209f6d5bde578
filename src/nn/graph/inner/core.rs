/*
 * @Description  : GraphInner 核心操作 + 前向传播
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::{NodeHandle, TraitNode};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    /// 创建一个带固定种子的计算图（确保可重复性）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_name_and_seed("default_graph", seed)
    }

    pub fn with_name(name: &str) -> Self {
        Self::build(name, StdRng::from_entropy(), false)
    }

    pub fn with_name_and_seed(name: &str, seed: u64) -> Self {
        Self::build(name, StdRng::seed_from_u64(seed), true)
    }

    fn build(name: &str, rng: StdRng, seeded: bool) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            forward_edges: HashMap::new(),
            last_forward_pass_id: 0,
            last_backward_pass_id: 0,
            next_id: 0,
            is_eval_mode: false,
            rng,
            seeded,
        }
    }

    // ========== 基础访问器 ==========

    /// 设置/重置图的随机种子（只影响之后创建的参数与 Dropout 节点）
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.seeded = true;
    }

    pub const fn has_seed(&self) -> bool {
        self.seeded
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 所有节点 id（按创建顺序）
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub const fn last_forward_pass_id(&self) -> u64 {
        self.last_forward_pass_id
    }

    pub const fn last_backward_pass_id(&self) -> u64 {
        self.last_backward_pass_id
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_nodes(&self, ids: &[NodeId]) -> Result<Vec<&NodeHandle>, GraphError> {
        ids.iter().map(|&id| self.get_node(id)).collect()
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.name() == name)
            .map(NodeHandle::id)
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        Ok(self.get_node(id)?.parents_ids().to_vec())
    }

    pub fn get_node_children(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.get_node(id)?;
        Ok(self.forward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_value_expected_shape(&self, id: NodeId) -> Result<&[usize], GraphError> {
        Ok(self.get_node(id)?.value_expected_shape())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    /// 设置输入节点或参数节点的值；其余节点的值只能由前向传播得到
    pub fn set_node_value(&mut self, id: NodeId, value: Option<&Tensor>) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.grad())
    }

    pub fn is_node_parameter(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.is_parameter())
    }

    /// 所有参数节点（按创建顺序）
    pub fn get_all_parameter_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .into_iter()
            .filter(|id| self.nodes[id].is_parameter())
            .collect()
    }

    pub(in crate::nn::graph) fn generate_valid_node_id(&mut self) -> NodeId {
        // 先递增再返回，所以第一个节点 ID 是 1
        self.next_id += 1;
        NodeId(self.next_id)
    }

    pub(in crate::nn::graph) fn check_duplicate_node_name(&self, name: &str) -> Result<(), GraphError> {
        if self.nodes.values().any(|node| node.name() == name) {
            return Err(GraphError::DuplicateNodeName(format!(
                "节点{}在图{}中重复",
                name,
                self.name()
            )));
        }
        Ok(())
    }

    pub(in crate::nn::graph) fn generate_valid_new_node_name(
        &self,
        base_name: &str,
        node_type: &str,
    ) -> Result<String, GraphError> {
        if !base_name.is_empty() {
            self.check_duplicate_node_name(base_name)?;
            return Ok(base_name.to_string());
        }

        let prefix = node_type.to_lowercase();
        let mut counter = 1;
        loop {
            let name = format!("{prefix}_{counter}");
            if self.check_duplicate_node_name(&name).is_ok() {
                return Ok(name);
            }
            counter += 1;
        }
    }

    // ========== 前向传播 ==========

    /// 计算`targets`的所有祖先节点的拓扑序（父节点总在子节点之前，每个节点只出现一次）
    pub(in crate::nn) fn topological_order(&self, targets: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        for &target in targets {
            // (节点, 父节点是否已展开)
            let mut stack = vec![(target, false)];
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    order.push(id);
                    continue;
                }
                if !visited.insert(id) {
                    continue;
                }
                stack.push((id, true));
                for &parent in self.get_node(id)?.parents_ids().iter().rev() {
                    if !visited.contains(&parent) {
                        stack.push((parent, false));
                    }
                }
            }
        }
        Ok(order)
    }

    pub fn forward(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        self.forward_many(&[node_id])
    }

    /// 在同一次前向传播中计算多个节点：共享的祖先节点只计算一次，
    /// 因而 Dropout 掩码、BatchNorm 批统计量在这些节点之间是一致的
    pub fn forward_many(&mut self, node_ids: &[NodeId]) -> Result<(), GraphError> {
        for &id in node_ids {
            self.get_node(id)?;
        }
        self.last_forward_pass_id += 1;
        let pass_id = self.last_forward_pass_id;

        for id in self.topological_order(node_ids)? {
            self.forward_node(id, pass_id)?;
        }
        Ok(())
    }

    /// 与`forward_many`相同，但本次传播不更新 BatchNorm 的滑动统计量。
    /// 用于训练模式下只读取损失、不做参数更新的前向传播
    pub fn forward_many_frozen(&mut self, node_ids: &[NodeId]) -> Result<(), GraphError> {
        self.set_stat_updates(false);
        let result = self.forward_many(node_ids);
        self.set_stat_updates(true);
        result
    }

    fn set_stat_updates(&mut self, enabled: bool) {
        for node in self.nodes.values_mut() {
            node.raw_node_mut().set_stat_updates(enabled);
        }
    }

    fn forward_node(&mut self, id: NodeId, pass_id: u64) -> Result<(), GraphError> {
        let node = self.get_node(id)?;
        if node.last_forward_pass_id() == pass_id {
            return Ok(());
        }
        if node.is_input() || node.is_parameter() {
            if node.value().is_none() {
                return Err(GraphError::InvalidOperation(format!(
                    "{}没有值，无法前向传播。请先通过set_node_value设置",
                    node
                )));
            }
            self.get_node_mut(id)?.set_last_forward_pass_id(pass_id);
            return Ok(());
        }

        // 暂时把节点移出，以便在可变借用它的同时读取父节点
        let parent_ids = node.parents_ids().to_vec();
        let mut handle = self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;
        let outcome = self.get_nodes(&parent_ids).and_then(|parents| {
            handle.raw_node_mut().calc_value_by_parents(&parents)
        });
        let result = match outcome {
            Ok(value) if value.shape() != handle.value_expected_shape() => {
                Err(GraphError::ComputationError(format!(
                    "{}的计算结果形状{:?}与预期{:?}不符",
                    handle,
                    value.shape(),
                    handle.value_expected_shape()
                )))
            }
            Ok(value) => {
                handle.set_computed_value(value, pass_id);
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.nodes.insert(id, handle);
        result
    }
}
