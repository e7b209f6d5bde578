/*
 * @Description  : Optimizer trait
 *
 * 核心特性：
 * - Optimizer 持有 Rc<RefCell<GraphInner>> 引用
 * - params 存储 Vec<Var>，一个优化器只负责一组参数（如 GAN 的生成器或判别器）
 * - minimize(loss) 一步完成训练，且只把梯度传播到自己的参数
 */

use crate::nn::{GraphError, Var};

/// Optimizer trait
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = RMSProp::new(&graph, &model.parameters(), 0.00015);
///
/// // 训练循环
/// optimizer.zero_grad()?;
/// loss.forward()?;
/// graph.inner_mut().backward_for(loss.node_id(), Some(&ids))?;
/// optimizer.step()?;
///
/// // 或者一步完成
/// let loss_val = optimizer.minimize(&loss)?;
/// ```
pub trait Optimizer {
    /// 清零所有参数的梯度
    fn zero_grad(&mut self) -> Result<(), GraphError>;

    /// 用已累积的梯度更新参数（只更新 Optimizer 绑定的参数）
    fn step(&mut self) -> Result<(), GraphError>;

    /// 一步完成训练：`zero_grad` → forward → 只对自身参数 backward → step
    ///
    /// 返回 loss 的标量值
    fn minimize(&mut self, loss: &Var) -> Result<f32, GraphError>;

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（如 RMSProp 的均方与动量槽）
    fn reset(&mut self);
}
