use crate::log::level::LogLevel;
use chrono::{DateTime, Local};

/// 时间戳格式：2025-01-19 12:34:56.789（本地时区，毫秒精度）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// 日志记录
///
/// 仅在一次输出调用内存在，格式化并写出后即丢弃
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// 日志级别
    pub level: LogLevel,
    /// 已完成参数替换的日志消息
    pub message: String,
    /// 时间戳
    pub timestamp: DateTime<Local>,
}

impl LogRecord {
    /// 创建新的日志记录，时间戳取当前时间
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Local::now(),
        }
    }

    /// 指定时间戳
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// 按 TIMESTAMP_FORMAT 渲染时间戳
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}
