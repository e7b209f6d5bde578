/*
 * @Description  : GraphInner 计算图的底层实现
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 基础操作 + forward
 * - backward.rs: VJP 反向传播
 * - mode.rs: train/eval
 * - node_builders.rs: new_*_node
 * - serialization.rs: save_params/load_params 底层参数序列化
 * - model_io.rs: save_model/load_model 高层模型 I/O
 * - describe.rs: describe/summary
 */

mod backward;
mod core;
mod describe;
mod mode;
mod model_io;
mod node_builders;
mod serialization;

use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// 图的完整定义（核心实现）
///
/// 用户通常通过 `Graph` 句柄使用此结构，需要直接操作节点时可通过 `graph.inner()` 访问。
pub struct GraphInner {
    pub(in crate::nn::graph) name: String,
    pub(in crate::nn::graph) nodes: HashMap<NodeId, NodeHandle>,
    /// 正向边：parent_id -> child_ids（父节点指向子节点）
    pub(in crate::nn::graph) forward_edges: HashMap<NodeId, Vec<NodeId>>,
    /// 最后一次前向传播的 id
    pub(in crate::nn::graph) last_forward_pass_id: u64,
    /// 最后一次反向传播的 id
    pub(in crate::nn::graph) last_backward_pass_id: u64,
    pub(in crate::nn::graph) next_id: u64,
    pub(in crate::nn::graph) is_eval_mode: bool,
    /// 图级别的随机数生成器：参数初始化与 Dropout 掩码的种子都由它派生
    pub(in crate::nn::graph) rng: StdRng,
    pub(in crate::nn::graph) seeded: bool,
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
