//! 日志初始化
//!
//! 库代码只用`tracing`宏记录日志，由二进制入口调用[`init_logger`]安装订阅器。
//! 环境变量`RUST_LOG`优先，否则使用传入的默认过滤规则（如`"info"`、`"digit_gan=debug"`）。

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

pub const DEFAULT_LOG_FILTER: &str = "info";

/// 安装全局日志订阅器；重复调用返回错误
pub fn init_logger(default_filter: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
}
