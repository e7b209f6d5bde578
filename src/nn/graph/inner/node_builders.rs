/*
 * @Description  : GraphInner 节点创建（new_*_node）
 *
 * 每个构建函数都会在建图时校验父节点数量与形状，`name`为 None 时自动生成`{类型}_{序号}`
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::raw_node::{
    Add, BatchNorm, BceLoss, BiasAdd, Conv2d, ConvTranspose2d, Dropout, Input, L2Penalty,
    LeakyReLU, MatMul, Parameter, Reshape, ResizeBilinear, ScalarMultiply, Sigmoid,
};
use crate::nn::nodes::{Init, NodeHandle, NodeType, TraitNode};
use crate::nn::padding::Padding;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

impl GraphInner {
    pub(in crate::nn::graph) fn add_node_to_list<T: Into<NodeType>>(
        &mut self,
        raw_node: T,
        name: Option<&str>,
        parents: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let mut raw_node = raw_node.into();
        raw_node.set_training(!self.is_eval_mode);
        let node_name = self.generate_valid_new_node_name(name.unwrap_or(""), raw_node.type_name())?;
        let node_id = self.generate_valid_node_id();

        for &parent_id in parents {
            self.forward_edges.entry(parent_id).or_default().push(node_id);
        }
        self.nodes.insert(
            node_id,
            NodeHandle::new(node_id, &node_name, raw_node, parents.to_vec()),
        );
        Ok(node_id)
    }

    // ========== 输入与参数 ==========

    pub fn new_input_node(&mut self, shape: &[usize], name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = Input::new(shape)?;
        self.add_node_to_list(node, name, &[])
    }

    /// 创建参数节点，并按`init`用图的随机数生成器初始化
    pub fn new_parameter_node(
        &mut self,
        shape: &[usize],
        init: Init,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Parameter::new(shape)?;
        let value = init.generate(shape, &mut self.rng);
        let id = self.add_node_to_list(node, name, &[])?;
        self.set_node_value(id, Some(&value))?;
        Ok(id)
    }

    // ========== 算子 ==========

    pub fn new_add_node(&mut self, a: NodeId, b: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = Add::new(&self.get_nodes(&[a, b])?)?;
        self.add_node_to_list(node, name, &[a, b])
    }

    pub fn new_bias_add_node(
        &mut self,
        input: NodeId,
        bias: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = BiasAdd::new(&self.get_nodes(&[input, bias])?)?;
        self.add_node_to_list(node, name, &[input, bias])
    }

    pub fn new_mat_mul_node(&mut self, a: NodeId, b: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = MatMul::new(&self.get_nodes(&[a, b])?)?;
        self.add_node_to_list(node, name, &[a, b])
    }

    pub fn new_scalar_multiply_node(
        &mut self,
        input: NodeId,
        scalar: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = ScalarMultiply::new(&self.get_nodes(&[input])?, scalar)?;
        self.add_node_to_list(node, name, &[input])
    }

    pub fn new_leaky_relu_node(
        &mut self,
        input: NodeId,
        negative_slope: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = LeakyReLU::new(&self.get_nodes(&[input])?, negative_slope)?;
        self.add_node_to_list(node, name, &[input])
    }

    pub fn new_sigmoid_node(&mut self, input: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = Sigmoid::new(&self.get_nodes(&[input])?)?;
        self.add_node_to_list(node, name, &[input])
    }

    /// Dropout 节点的掩码随机数生成器由图的随机数生成器派生
    pub fn new_dropout_node(
        &mut self,
        input: NodeId,
        rate: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let rng = StdRng::seed_from_u64(self.rng.next_u64());
        let node = Dropout::new(&self.get_nodes(&[input])?, rate, !self.is_eval_mode, rng)?;
        self.add_node_to_list(node, name, &[input])
    }

    /// `gamma`为 None 时只做平移（center），不做缩放（scale）
    pub fn new_batch_norm_node(
        &mut self,
        input: NodeId,
        beta: NodeId,
        gamma: Option<NodeId>,
        momentum: f32,
        eps: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let mut parents = vec![input, beta];
        parents.extend(gamma);
        let node = BatchNorm::new(&self.get_nodes(&parents)?, momentum, eps, !self.is_eval_mode)?;
        self.add_node_to_list(node, name, &parents)
    }

    pub fn new_reshape_node(
        &mut self,
        input: NodeId,
        target_shape: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Reshape::new(&self.get_nodes(&[input])?, target_shape)?;
        self.add_node_to_list(node, name, &[input])
    }

    pub fn new_resize_bilinear_node(
        &mut self,
        input: NodeId,
        size: (usize, usize),
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = ResizeBilinear::new(&self.get_nodes(&[input])?, size)?;
        self.add_node_to_list(node, name, &[input])
    }

    pub fn new_conv2d_node(
        &mut self,
        input: NodeId,
        kernel: NodeId,
        stride: (usize, usize),
        padding: Padding,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Conv2d::new(&self.get_nodes(&[input, kernel])?, stride, padding)?;
        self.add_node_to_list(node, name, &[input, kernel])
    }

    pub fn new_conv_transpose2d_node(
        &mut self,
        input: NodeId,
        kernel: NodeId,
        stride: (usize, usize),
        padding: Padding,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = ConvTranspose2d::new(&self.get_nodes(&[input, kernel])?, stride, padding)?;
        self.add_node_to_list(node, name, &[input, kernel])
    }

    // ========== 损失 ==========

    /// 目标为常数`target`的二元交叉熵
    pub fn new_bce_loss_node(
        &mut self,
        prediction: NodeId,
        target: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = BceLoss::new(&self.get_nodes(&[prediction])?, target, BceLoss::DEFAULT_EPS)?;
        self.add_node_to_list(node, name, &[prediction])
    }

    pub fn new_l2_penalty_node(
        &mut self,
        params: &[NodeId],
        scale: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = L2Penalty::new(&self.get_nodes(params)?, scale)?;
        self.add_node_to_list(node, name, params)
    }
}
