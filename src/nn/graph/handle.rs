/*
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::GraphInner;
use crate::nn::nodes::Init;
use crate::nn::var::Var;
use crate::nn::NodeId;
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Graph - 计算图句柄（PyTorch 风格用户 API）
///
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    // ==================== 创建 ====================

    pub fn new() -> Self {
        Self::from_inner(GraphInner::new())
    }

    /// 创建带种子的图（用于确定性训练）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    pub fn with_name_and_seed(name: &str, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_inner(GraphInner::with_name_and_seed(name, seed)),
            None => Self::from_inner(GraphInner::with_name(name)),
        }
    }

    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    /// 获取内部 GraphInner 的不可变引用
    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    /// 获取内部 GraphInner 的可变引用
    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    pub(crate) fn inner_rc(&self) -> Rc<RefCell<GraphInner>> {
        Rc::clone(&self.inner)
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, self.inner_rc())
    }

    // ==================== 创建变量 ====================

    /// 创建输入节点并设置数据
    pub fn input(&self, data: &Tensor) -> Result<Var, GraphError> {
        let var = self.input_shape(data.shape(), None)?;
        var.set_value(data)?;
        Ok(var)
    }

    /// 创建带形状的输入节点（值稍后通过`Var::set_value`喂入）
    pub fn input_shape(&self, shape: &[usize], name: Option<&str>) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_input_node(shape, name)?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建参数节点
    pub fn parameter(&self, shape: &[usize], init: Init, name: &str) -> Result<Var, GraphError> {
        let node_id = self
            .inner
            .borrow_mut()
            .new_parameter_node(shape, init, Some(name))?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 一组变量的 L2 正则项：`scale * Σ sum(w²) / 2`
    pub fn l2_penalty(&self, params: &[Var], scale: f32) -> Result<Var, GraphError> {
        if let Some(foreign) = params.iter().find(|p| !Rc::ptr_eq(p.graph(), &self.inner)) {
            return Err(GraphError::InvalidOperation(format!(
                "变量{:?}不属于图{}",
                foreign.node_id(),
                self.inner.borrow().name()
            )));
        }
        let ids: Vec<NodeId> = params.iter().map(Var::node_id).collect();
        let node_id = self.inner.borrow_mut().new_l2_penalty_node(&ids, scale, None)?;
        Ok(self.wrap_node_id(node_id))
    }

    // ==================== 执行 ====================

    pub fn forward(&self, output: &Var) -> Result<(), GraphError> {
        self.inner.borrow_mut().forward(output.node_id())
    }

    /// 在同一次前向传播中计算多个输出
    pub fn forward_many(&self, outputs: &[&Var]) -> Result<(), GraphError> {
        let ids: Vec<_> = outputs.iter().map(|v| v.node_id()).collect();
        self.inner.borrow_mut().forward_many(&ids)
    }

    /// 同`forward_many`，但不更新 BatchNorm 的滑动统计量
    pub fn forward_many_frozen(&self, outputs: &[&Var]) -> Result<(), GraphError> {
        let ids: Vec<_> = outputs.iter().map(|v| v.node_id()).collect();
        self.inner.borrow_mut().forward_many_frozen(&ids)
    }

    pub fn backward(&self, loss: &Var) -> Result<f32, GraphError> {
        loss.backward()
    }

    pub fn zero_grad(&self) {
        self.inner.borrow_mut().zero_grad();
    }

    /// 切换到训练模式
    pub fn train(&self) {
        self.inner.borrow_mut().set_train_mode();
    }

    /// 切换到评估模式
    pub fn eval(&self) {
        self.inner.borrow_mut().set_eval_mode();
    }

    pub fn is_eval(&self) -> bool {
        !self.inner.borrow().is_train_mode()
    }

    // ==================== 保存/加载 ====================

    /// 只保存参数（含 BatchNorm 滑动统计量）
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow().save_params(path)
    }

    pub fn load_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow_mut().load_params(path)
    }

    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow().save_model(path)
    }

    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow_mut().load_model(path)
    }

    pub fn summary(&self) -> String {
        self.inner.borrow().summary()
    }
}
