use crate::nn::{GraphError, Var, VarActivationOps};

/// Dropout 层：没有参数，只记录丢弃概率
#[derive(Debug, Clone, Copy)]
pub struct Dropout {
    rate: f32,
}

impl Dropout {
    pub fn new(rate: f32) -> Result<Self, GraphError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(GraphError::InvalidOperation(format!(
                "Dropout的rate必须在[0, 1)内，但得到: {rate}"
            )));
        }
        Ok(Self { rate })
    }

    pub const fn rate(&self) -> f32 {
        self.rate
    }

    pub fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        x.dropout(self.rate)
    }
}
