/*
 * @Description  : GraphInner describe/summary 相关方法
 */

use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::descriptor::{GraphDescriptor, NodeDescriptor};
use crate::nn::nodes::TraitNode;
use std::fmt::Write;

impl GraphInner {
    /// 导出图的描述符（按节点 ID 排序，输出顺序稳定）
    pub fn describe(&self) -> GraphDescriptor {
        let mut descriptor = GraphDescriptor::new(&self.name);
        for id in self.nodes() {
            let node = &self.nodes[&id];
            descriptor.add_node(NodeDescriptor::new(
                id.0,
                node.name(),
                node.raw_node().descriptor(),
                node.value_expected_shape().to_vec(),
                node.parents_ids().iter().map(|p| p.0).collect(),
            ));
        }
        descriptor
    }

    /// 模型摘要（类似 Keras 的 `model.summary()`）：每行一个节点
    pub fn summary(&self) -> String {
        let descriptor = self.describe();
        let mut out = String::new();
        let _ = writeln!(out, "图 {}（{} 个节点）", self.name, descriptor.nodes.len());
        let _ = writeln!(
            out,
            "{:<36} {:<16} {:<20} {:>10}",
            "节点名称", "类型", "输出形状", "参数量"
        );
        for node in &descriptor.nodes {
            let _ = writeln!(
                out,
                "{:<36} {:<16} {:<20} {:>10}",
                node.name,
                self.nodes
                    .get(&NodeId(node.id))
                    .map_or("?", |n| n.type_name()),
                format!("{:?}", node.output_shape),
                node.param_count.map_or("-".to_string(), |c| c.to_string()),
            );
        }
        let _ = writeln!(out, "总参数量: {}", descriptor.total_params());
        out
    }
}
