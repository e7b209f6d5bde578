/*
 * @Description  : Module trait 定义
 */

use super::Var;

/// 模块 trait
///
/// - `forward()` 不是 trait 方法（签名各异）
/// - `parameters()` 返回 `Vec<Var>`，优化器、正则项与参数统计都依赖它
/// - 由于 Var 携带图引用，`forward()` 不需要 `&Graph` 参数
pub trait Module {
    /// 获取所有可训练参数
    fn parameters(&self) -> Vec<Var>;

    /// 参数张量的个数
    fn num_params(&self) -> usize {
        self.parameters().len()
    }

    /// 标量参数总数
    fn num_scalars(&self) -> usize {
        self.parameters()
            .iter()
            .filter_map(|p| p.value_expected_shape().ok())
            .map(|shape| shape.iter().product::<usize>())
            .sum()
    }
}
