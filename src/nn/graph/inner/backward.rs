/*
 * @Description  : GraphInner VJP 反向传播
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::TraitNode;
use crate::tensor::Tensor;
use std::collections::{HashMap, HashSet};
use tracing::warn;

impl GraphInner {
    // ========== VJP 反向传播 ==========

    /// 反向传播到图中所有可达的参数节点，返回损失值
    pub fn backward(&mut self, loss: NodeId) -> Result<f32, GraphError> {
        self.backward_for(loss, None)
    }

    /// 反向传播，只把梯度传到`targets`中的参数节点（`None`表示所有参数）。
    ///
    /// 传播范围限定在`loss`与这些参数之间的子图上，与其无关的分支（例如训练判别器时的生成器部分）
    /// 完全不会被计算。参数节点的梯度会累加，直到调用`zero_grad`/`clear_grads`
    pub fn backward_for(&mut self, loss: NodeId, targets: Option<&[NodeId]>) -> Result<f32, GraphError> {
        let loss_node = self.get_node(loss)?;
        let loss_value = loss_node.value().ok_or_else(|| {
            GraphError::ComputationError(format!("损失{loss_node}没有值，请先执行 forward"))
        })?;
        let loss_scalar = loss_value.get_data_number().ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "反向传播的起点必须是标量，{}的形状为{:?}",
                loss_node,
                loss_value.shape()
            ))
        })?;
        let loss_shape = loss_value.shape().to_vec();
        if self.is_eval_mode {
            warn!("在 eval 模式下调用 backward，这通常是误用");
        }

        let order = self.topological_order(&[loss])?;
        let target_set: HashSet<NodeId> = match targets {
            Some(ids) => ids.iter().copied().collect(),
            None => order
                .iter()
                .copied()
                .filter(|id| self.nodes[id].is_parameter())
                .collect(),
        };

        // 需要梯度的节点：自身是目标参数，或某个父节点需要梯度
        let mut needs_grad = HashSet::new();
        for &id in &order {
            let node = self.get_node(id)?;
            let needed = if node.is_parameter() {
                target_set.contains(&id)
            } else {
                node.parents_ids().iter().any(|p| needs_grad.contains(p))
            };
            if needed {
                needs_grad.insert(id);
            }
        }

        // 中间节点的梯度只属于本次反向传播
        for &id in &order {
            let node = self.get_node_mut(id)?;
            if !node.is_parameter() {
                node.set_grad(None);
            }
        }

        let mut pending: HashMap<NodeId, Tensor> = HashMap::new();
        if needs_grad.contains(&loss) {
            pending.insert(loss, Tensor::ones(&loss_shape));
        }

        for &id in order.iter().rev() {
            let Some(grad) = pending.remove(&id) else {
                continue;
            };

            let node = self.get_node(id)?;
            if !node.is_parameter() {
                let parent_ids = node.parents_ids().to_vec();
                let parents = self.get_nodes(&parent_ids)?;
                let value = node.value().ok_or_else(|| {
                    GraphError::ComputationError(format!("{node}没有值，请先执行 forward"))
                })?;
                for (index, parent_id) in parent_ids.iter().enumerate() {
                    if !needs_grad.contains(parent_id) {
                        continue;
                    }
                    let parent_grad = node
                        .raw_node()
                        .calc_grad_to_parent(index, &parents, value, &grad)?;
                    match pending.get_mut(parent_id) {
                        Some(acc) => *acc += &parent_grad,
                        None => {
                            pending.insert(*parent_id, parent_grad);
                        }
                    }
                }
            }

            let node = self.get_node_mut(id)?;
            if node.is_parameter() {
                node.accumulate_grad(&grad);
            } else {
                node.set_grad(Some(grad));
            }
        }

        self.last_backward_pass_id += 1;
        Ok(loss_scalar)
    }

    /// 清除所有节点的梯度
    pub fn zero_grad(&mut self) {
        for node in self.nodes.values_mut() {
            node.set_grad(None);
        }
    }

    /// 清除指定节点的梯度
    pub fn clear_grads(&mut self, ids: &[NodeId]) -> Result<(), GraphError> {
        for &id in ids {
            self.get_node_mut(id)?.set_grad(None);
        }
        Ok(())
    }
}
