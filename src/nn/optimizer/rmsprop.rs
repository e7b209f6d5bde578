/*
 * @Description  : RMSProp 优化器（TensorFlow-1 语义）
 */

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Optimizer;
use crate::nn::graph::GraphInner;
use crate::nn::{Graph, GraphError, NodeId, Var};
use crate::tensor::Tensor;

/// 单个参数的优化器状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmsPropSlot {
    /// 梯度平方的滑动均值
    pub ms: Tensor,
    /// 动量
    pub mom: Tensor,
}

/// 可序列化的优化器状态，按参数名索引（参数名在同一张图内唯一，且重新建图后不变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmsPropState {
    pub learning_rate: f32,
    pub decay: f32,
    pub momentum: f32,
    pub epsilon: f32,
    pub slots: BTreeMap<String, RmsPropSlot>,
}

/// RMSProp 优化器
///
/// - ms = decay * ms + (1 - decay) * g²（ms 初始化为 1）
/// - mom = momentum * mom + lr * g / √(ms + ε)
/// - θ = θ - mom
///
/// # 使用示例
/// ```ignore
/// let mut opt_d = RMSProp::new(&graph, &discriminator.parameters(), 0.00015);
/// let d_loss = opt_d.minimize(&d_objective)?;
/// ```
pub struct RMSProp {
    graph: Rc<RefCell<GraphInner>>,
    params: Vec<Var>,
    lr: f32,
    decay: f32,
    momentum: f32,
    epsilon: f32,
    ms: HashMap<NodeId, Tensor>,
    mom: HashMap<NodeId, Tensor>,
}

impl RMSProp {
    /// 使用默认的 decay = 0.9、momentum = 0、ε = 1e-10
    pub fn new(graph: &Graph, params: &[Var], lr: f32) -> Self {
        Self::new_with_config(graph, params, lr, 0.9, 0.0, 1e-10)
    }

    pub fn new_with_config(
        graph: &Graph,
        params: &[Var],
        lr: f32,
        decay: f32,
        momentum: f32,
        epsilon: f32,
    ) -> Self {
        Self {
            graph: graph.inner_rc(),
            params: params.to_vec(),
            lr,
            decay,
            momentum,
            epsilon,
            ms: HashMap::new(),
            mom: HashMap::new(),
        }
    }

    pub fn params(&self) -> &[Var] {
        &self.params
    }

    fn param_ids(&self) -> Vec<NodeId> {
        self.params.iter().map(Var::node_id).collect()
    }

    /// 获取指定参数的均方状态
    pub fn get_mean_square(&self, param: &Var) -> Option<&Tensor> {
        self.ms.get(&param.node_id())
    }

    pub fn get_momentum(&self, param: &Var) -> Option<&Tensor> {
        self.mom.get(&param.node_id())
    }

    /// 导出优化器状态（用于存档）
    pub fn state(&self) -> Result<RmsPropState, GraphError> {
        let g = self.graph.borrow();
        let mut slots = BTreeMap::new();
        for param in &self.params {
            let id = param.node_id();
            if let (Some(ms), Some(mom)) = (self.ms.get(&id), self.mom.get(&id)) {
                slots.insert(
                    g.get_node_name(id)?.to_string(),
                    RmsPropSlot {
                        ms: ms.clone(),
                        mom: mom.clone(),
                    },
                );
            }
        }
        Ok(RmsPropState {
            learning_rate: self.lr,
            decay: self.decay,
            momentum: self.momentum,
            epsilon: self.epsilon,
            slots,
        })
    }

    /// 导入优化器状态；状态里的每个槽都必须对应本优化器的一个同形状参数
    pub fn load_state(&mut self, state: &RmsPropState) -> Result<(), GraphError> {
        let g = self.graph.borrow();
        let mut by_name = HashMap::new();
        for param in &self.params {
            let id = param.node_id();
            by_name.insert(g.get_node_name(id)?.to_string(), id);
        }

        let mut ms = HashMap::new();
        let mut mom = HashMap::new();
        for (name, slot) in &state.slots {
            let id = *by_name.get(name).ok_or_else(|| {
                GraphError::InvalidOperation(format!("优化器状态中的参数{name}不属于本优化器"))
            })?;
            let expected = g.get_node_value_expected_shape(id)?;
            for tensor in [&slot.ms, &slot.mom] {
                if tensor.shape() != expected {
                    return Err(GraphError::ShapeMismatch {
                        expected: expected.to_vec(),
                        got: tensor.shape().to_vec(),
                        message: format!("参数{name}的优化器状态形状不匹配"),
                    });
                }
            }
            ms.insert(id, slot.ms.clone());
            mom.insert(id, slot.mom.clone());
        }
        drop(g);

        self.lr = state.learning_rate;
        self.decay = state.decay;
        self.momentum = state.momentum;
        self.epsilon = state.epsilon;
        self.ms = ms;
        self.mom = mom;
        debug!("已载入{}个参数的RMSProp状态", self.ms.len());
        Ok(())
    }
}

impl Optimizer for RMSProp {
    fn zero_grad(&mut self) -> Result<(), GraphError> {
        let ids = self.param_ids();
        self.graph.borrow_mut().clear_grads(&ids)
    }

    fn step(&mut self) -> Result<(), GraphError> {
        let mut g = self.graph.borrow_mut();
        for param in &self.params {
            let node_id = param.node_id();
            let Some(grad) = g.get_node_grad(node_id)?.cloned() else {
                continue;
            };
            let current = g.get_node_value(node_id)?.ok_or_else(|| {
                GraphError::ComputationError(format!("参数节点 {node_id:?} 没有值"))
            })?;

            let ms = self
                .ms
                .entry(node_id)
                .or_insert_with(|| Tensor::ones(grad.shape()));
            *ms *= self.decay;
            *ms += &(grad.square() * (1.0 - self.decay));

            let epsilon = self.epsilon;
            let scaled = grad.zip_map(ms, |g, s| g / (s + epsilon).sqrt()) * self.lr;
            let mom = self
                .mom
                .entry(node_id)
                .or_insert_with(|| Tensor::zeros(grad.shape()));
            *mom *= self.momentum;
            *mom += &scaled;

            let new_value = current - &*mom;
            g.set_node_value(node_id, Some(&new_value))?;
        }
        Ok(())
    }

    fn minimize(&mut self, loss: &Var) -> Result<f32, GraphError> {
        self.zero_grad()?;
        let ids = self.param_ids();
        let loss_val = {
            let mut g = self.graph.borrow_mut();
            g.forward(loss.node_id())?;
            g.backward_for(loss.node_id(), Some(&ids))?
        };
        self.step()?;
        Ok(loss_val)
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.ms.clear();
        self.mom.clear();
    }
}
