use super::Tensor;

impl Tensor {
    /// 通用的条件过滤函数，可以灵活处理张量中的元素
    ///
    /// # 参数
    /// * `condition` - 条件函数，接收元素值并返回bool
    /// * `true_fn` - 当条件为true时的值转换函数
    /// * `false_fn` - 当条件为false时的值转换函数
    ///
    /// # 示例
    /// ```
    /// use digit_gan::tensor::Tensor;
    /// let t = Tensor::new(&[-1.0, 0.0, 1.0], &[3]);
    ///
    /// // 类似 np.where(x > 0.0, x, 0.2 * x)
    /// let result = t.where_with_f32(|x| x > 0.0, |x| x, |x| 0.2 * x);
    /// assert_eq!(result, Tensor::new(&[-0.2, 0.0, 1.0], &[3]));
    /// ```
    pub fn where_with_f32<F, T, U>(&self, condition: F, true_fn: T, false_fn: U) -> Self
    where
        F: Fn(f32) -> bool,
        T: Fn(f32) -> f32,
        U: Fn(f32) -> f32,
    {
        self.map(|x| {
            if x.is_nan() {
                f32::NAN
            } else if condition(x) {
                true_fn(x)
            } else {
                false_fn(x)
            }
        })
    }
}
