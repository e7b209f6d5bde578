//! GAN 训练的顶层错误类型

use thiserror::Error;

use crate::data::DataError;
use crate::nn::GraphError;

#[derive(Debug, Error)]
pub enum GanError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("配置错误: {0}")]
    Config(String),
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("训练状态序列化失败: {0}")]
    State(#[from] bincode::Error),
    #[error("图像输出失败: {0}")]
    Image(#[from] image::ImageError),
    #[error("日志初始化失败: {0}")]
    Logger(#[from] tracing_subscriber::util::TryInitError),
    #[error("检查点错误: {0}")]
    Checkpoint(String),
}
