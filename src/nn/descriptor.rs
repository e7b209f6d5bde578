/*
 * @Description  : 图描述符（Graph Descriptor）
 *                 保存模型时写出的 `{name}.json` 即为它的 JSON 形式；
 *                 加载模型时也用它校验当前图与文件中的拓扑是否一致
 */

use crate::nn::padding::Padding;
use serde::{Deserialize, Serialize};

/// 图的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescriptor {
    /// 格式版本（crate 版本号）
    pub version: String,
    pub name: String,
    pub nodes: Vec<NodeDescriptor>,
    /// 参数文件路径（相对于 JSON 文件），仅在保存完整模型时使用
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_file: Option<String>,
}

/// 节点描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub id: u64,
    pub name: String,
    pub node_type: NodeTypeDescriptor,
    pub output_shape: Vec<usize>,
    /// 父节点 ID 列表（定义拓扑）
    pub parents: Vec<u64>,
    /// 参数数量（仅 Parameter 类型有意义）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_count: Option<usize>,
}

/// 节点类型描述（包含类型特定参数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeTypeDescriptor {
    Input,
    Parameter,
    Add,
    BiasAdd,
    MatMul,
    ScalarMultiply {
        scalar: f32,
    },
    LeakyReLU {
        alpha: f32,
    },
    Sigmoid,
    Dropout {
        rate: f32,
    },
    BatchNorm {
        momentum: f32,
        eps: f32,
        scale: bool,
    },
    Reshape {
        target_shape: Vec<usize>,
    },
    ResizeBilinear {
        size: (usize, usize),
    },
    Conv2d {
        stride: (usize, usize),
        padding: Padding,
    },
    ConvTranspose2d {
        stride: (usize, usize),
        padding: Padding,
    },
    BceLoss {
        target: f32,
        eps: f32,
    },
    L2Penalty {
        scale: f32,
    },
}

impl GraphDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.to_string(),
            nodes: Vec::new(),
            params_file: None,
        }
    }

    pub fn add_node(&mut self, node: NodeDescriptor) {
        self.nodes.push(node);
    }

    /// 获取总参数量
    pub fn total_params(&self) -> usize {
        self.nodes.iter().filter_map(|n| n.param_count).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 拓扑是否一致：节点名称、类型、形状与父节点（按名称）逐一相同。
    /// 版本号与参数文件名不参与比较
    pub fn same_topology(&self, other: &Self) -> bool {
        let names_of = |desc: &Self, node: &NodeDescriptor| -> Vec<String> {
            node.parents
                .iter()
                .filter_map(|pid| desc.nodes.iter().find(|n| n.id == *pid))
                .map(|n| n.name.clone())
                .collect()
        };
        self.nodes.len() == other.nodes.len()
            && self.nodes.iter().zip(other.nodes.iter()).all(|(a, b)| {
                a.name == b.name
                    && a.node_type == b.node_type
                    && a.output_shape == b.output_shape
                    && names_of(self, a) == names_of(other, b)
            })
    }
}

impl NodeDescriptor {
    pub fn new(
        id: u64,
        name: &str,
        node_type: NodeTypeDescriptor,
        output_shape: Vec<usize>,
        parents: Vec<u64>,
    ) -> Self {
        let param_count = if matches!(node_type, NodeTypeDescriptor::Parameter) {
            Some(output_shape.iter().product())
        } else {
            None
        };

        Self {
            id,
            name: name.to_string(),
            node_type,
            output_shape,
            parents,
            param_count,
        }
    }
}
