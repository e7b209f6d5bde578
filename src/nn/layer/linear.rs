/*
 * @Description  : Linear (全连接) 层
 */

use crate::nn::{Graph, GraphError, Init, Module, Var, VarMatrixOps};

/// Linear (全连接) 层：`output = x @ W + b`
///
/// # 输入/输出形状
/// - 输入：[batch_size, in_features]
/// - 输出：[batch_size, out_features]
///
/// # 使用示例
/// ```ignore
/// let fc = Linear::new(&graph, 784, 128, true, "fc1")?;
/// let h = fc.forward(&x)?.leaky_relu(0.2)?;
/// ```
#[derive(Debug)]
pub struct Linear {
    /// 权重参数 [in_features, out_features]
    weights: Var,
    /// 偏置参数 [1, out_features]（可选）
    bias: Option<Var>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// 权重用 Glorot 均匀分布初始化，偏置为零
    pub fn new(
        graph: &Graph,
        in_features: usize,
        out_features: usize,
        use_bias: bool,
        name: &str,
    ) -> Result<Self, GraphError> {
        let weights = graph.parameter(
            &[in_features, out_features],
            Init::GlorotUniform {
                fan_in: in_features,
                fan_out: out_features,
            },
            &format!("{name}/kernel"),
        )?;
        let bias = if use_bias {
            Some(graph.parameter(&[1, out_features], Init::Zeros, &format!("{name}/bias"))?)
        } else {
            None
        };

        Ok(Self {
            weights,
            bias,
            in_features,
            out_features,
        })
    }

    /// 计算 `x @ W + b`
    pub fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        let h = x.matmul(&self.weights)?;
        match &self.bias {
            Some(b) => h.bias_add(b),
            None => Ok(h),
        }
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn out_features(&self) -> usize {
        self.out_features
    }

    pub const fn weights(&self) -> &Var {
        &self.weights
    }

    pub const fn bias(&self) -> Option<&Var> {
        self.bias.as_ref()
    }
}

impl Module for Linear {
    fn parameters(&self) -> Vec<Var> {
        let mut params = vec![self.weights.clone()];
        params.extend(self.bias.clone());
        params
    }
}
