/*
 * @Description  : BatchNorm (批归一化) 层
 */

use crate::nn::{Graph, GraphError, Init, Module, Var};

/// BatchNorm 层
///
/// 输入 [batch, C] 或 [batch, C, H, W]，按通道归一化。
/// `beta`（平移）总是存在；`scale` 为 true 时才有可学习的缩放 `gamma`
#[derive(Debug)]
pub struct BatchNorm {
    beta: Var,
    gamma: Option<Var>,
    momentum: f32,
    eps: f32,
}

impl BatchNorm {
    pub fn new(
        graph: &Graph,
        channels: usize,
        momentum: f32,
        eps: f32,
        scale: bool,
        name: &str,
    ) -> Result<Self, GraphError> {
        let beta = graph.parameter(&[1, channels], Init::Zeros, &format!("{name}/beta"))?;
        let gamma = if scale {
            Some(graph.parameter(&[1, channels], Init::Ones, &format!("{name}/gamma"))?)
        } else {
            None
        };
        Ok(Self {
            beta,
            gamma,
            momentum,
            eps,
        })
    }

    pub fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        x.check_same_graph(&self.beta, "批归一化")?;
        let beta = self.beta.node_id();
        let gamma = self.gamma.as_ref().map(Var::node_id);
        let (momentum, eps) = (self.momentum, self.eps);
        x.derive(|g| g.new_batch_norm_node(x.node_id(), beta, gamma, momentum, eps, None))
    }
}

impl Module for BatchNorm {
    fn parameters(&self) -> Vec<Var> {
        let mut params = vec![self.beta.clone()];
        params.extend(self.gamma.clone());
        params
    }
}
