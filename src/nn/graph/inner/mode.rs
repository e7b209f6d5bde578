/*
 * @Description  : GraphInner 训练/评估模式
 */

use super::GraphInner;
use crate::nn::nodes::TraitNode;

impl GraphInner {
    /// 训练模式：Dropout 生效，BatchNorm 使用批统计量并更新滑动统计量
    pub fn set_train_mode(&mut self) {
        self.set_mode(false);
    }

    /// 评估模式：Dropout 为恒等映射，BatchNorm 使用滑动统计量
    pub fn set_eval_mode(&mut self) {
        self.set_mode(true);
    }

    pub const fn is_train_mode(&self) -> bool {
        !self.is_eval_mode
    }

    fn set_mode(&mut self, eval: bool) {
        self.is_eval_mode = eval;
        for node in self.nodes.values_mut() {
            node.raw_node_mut().set_training(!eval);
        }
    }
}
