use colored::Color;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// 日志级别
///
/// 严重程度依次递增：Debug < Info < Warn < Error < Fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum LogLevel {
    /// 调试信息
    Debug = 0,
    /// 一般信息
    Info = 1,
    /// 警告信息
    Warn = 2,
    /// 错误信息
    Error = 3,
    /// 致命错误，输出后进程需要退出
    Fatal = 4,
}

impl LogLevel {
    /// 按严重程度排列的全部级别
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// 级别的规范名称
    pub const fn name(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// 级别对应的颜色装饰器
    pub const fn decorator(&self) -> Decorator {
        match self {
            LogLevel::Debug => Decorator::new(Color::Blue, false),
            LogLevel::Info => Decorator::new(Color::Green, false),
            LogLevel::Warn => Decorator::new(Color::Yellow, false),
            LogLevel::Error => Decorator::new(Color::Red, false),
            LogLevel::Fatal => Decorator::new(Color::BrightRed, true),
        }
    }

    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// 按数值返回级别名称，超出范围时返回 "UNKNOWN"
pub fn level_name(rank: u8) -> &'static str {
    LogLevel::try_from(rank).map_or("UNKNOWN", |level| level.name())
}

impl TryFrom<u8> for LogLevel {
    type Error = u8;

    fn try_from(rank: u8) -> Result<Self, u8> {
        LogLevel::ALL.get(rank as usize).copied().ok_or(rank)
    }
}

/// 解析不区分大小写，无法识别的名称（包括空串）一律视为 Info
impl FromStr for LogLevel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARN" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            "FATAL" => LogLevel::Fatal,
            _ => LogLevel::Info,
        })
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(level) => level,
            Err(never) => match never {},
        }
    }
}

impl From<String> for LogLevel {
    fn from(s: String) -> Self {
        LogLevel::from(s.as_str())
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error | LogLevel::Fatal => log::LevelFilter::Error,
        }
    }
}

/// `log` crate 的 Trace 没有对应级别，按 Debug 处理
impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Error => LogLevel::Error,
        }
    }
}

/// 颜色装饰器
///
/// 用 ANSI 转义序列包裹一段文本，颜色编码取自 `colored::Color`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decorator {
    pub color: Color,
    pub bold: bool,
}

impl Decorator {
    pub const fn new(color: Color, bold: bool) -> Self {
        Self { color, bold }
    }

    /// 将着色后的文本追加到 buffer
    pub fn paint_to(&self, buffer: &mut String, text: &str) {
        buffer.push_str("\x1b[");
        if self.bold {
            buffer.push_str("1;");
        }
        buffer.push_str(&self.color.to_fg_str());
        buffer.push('m');
        buffer.push_str(text);
        buffer.push_str("\x1b[0m");
    }

    pub fn paint(&self, text: &str) -> String {
        let mut buffer = String::with_capacity(text.len() + 12);
        self.paint_to(&mut buffer, text);
        buffer
    }
}

impl std::fmt::Display for Decorator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("\x1b[")?;
        if self.bold {
            f.write_str("1;")?;
        }
        write!(f, "{}m", self.color.to_fg_str())
    }
}
