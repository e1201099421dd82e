//! 日志模块
//!
//! 分级日志，输出到终端和/或文件，文件由后台任务按大小和时间切分。
//!
//! # 特性
//!
//! - 五个日志级别：Debug, Info, Warn, Error, Fatal
//! - 三种格式：text、json、color（按级别着色）
//! - 输出目标：stdout、file、both
//! - 按大小或时间切分，保留最近修改的若干个备份，可选 gzip 压缩
//! - 配置来自 LOG_* 环境变量或 JSON5/YAML/TOML 文档
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use rotlog::log::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_json(r#"
//!         {
//!             level: "debug",
//!             format: "text",
//!             output: "both",
//!             file_path: "logs/app.log",
//!             max_size_mb: 10,
//!             check_interval: "30s",
//!         }
//!     "#)?;
//!
//!     let logger = Logger::new(config);
//!     rotlog::info!(logger, "application started on port {}", 8080);
//!     logger.error("connection failed").await;
//!
//!     logger.close().await;
//!     Ok(())
//! }
//! ```

pub mod appender;
pub mod config;
pub mod error;
pub mod formatter;
pub mod global;
pub mod level;
pub mod log_record;
pub mod logger;
pub mod macros;
pub mod rotation;

// 重新导出核心类型
pub use appender::{ConsoleAppender, FileAppender, LogAppender, RotateOutcome, SharedBuffer, SinkState};
pub use config::{Config, Destination, Format};
pub use error::SinkError;
pub use formatter::{
    create_formatter, JsonFormatter, JsonFormatterConfig, LogFormatter, TextFormatter,
    TextFormatterConfig,
};
pub use level::{level_name, Decorator, LogLevel};
pub use log_record::LogRecord;
pub use logger::{Emit, Logger, Shutdown, FATAL_EXIT_CODE};
pub use rotation::{RotationHandle, RotationManager, RotationPolicy};

pub use global::{
    debug, error, fatal, info, init, init_from_env, install_log_bridge, logger, warn,
};
