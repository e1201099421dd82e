//! rotlog - 带文件切分的分级日志库
//!
//! ## 模块
//!
//! - **log**: 日志级别、格式化、输出目标、文件切分和全局 Logger
//! - **cfg**: 配置辅助（人类可读的时长、由配置构造组件的宏）
//!
//! ## 设计
//!
//! - 🔒 **无错误返回**: 记录日志永远不会失败，输出错误报告到标准错误流
//! - 🔄 **后台切分**: 每个 Logger 一个 tokio 任务，按大小或时间切分
//! - 🛑 **显式退出**: FATAL 返回 `Shutdown`，由调用方决定何时终止进程

pub mod cfg;
pub mod log;

// 重新导出主要的公共 API
pub use self::cfg::HumanDur;
pub use self::log::{Config, Destination, Emit, Format, LogLevel, LogRecord, Logger, Shutdown};
