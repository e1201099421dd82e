use crate::log::formatter::LogFormatter;
use crate::log::log_record::{LogRecord, TIMESTAMP_FORMAT};
use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::fmt::Write;

/// TextFormatter 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct TextFormatterConfig {
    /// 是否用级别颜色包裹消息
    #[default = false]
    pub colored: bool,
}

/// 文本格式化器
///
/// 输出格式：`[2025-01-19 12:34:56.789] [INFO] message`
///
/// 开启 colored 时只有消息部分被级别颜色包裹，前缀保持原样
pub struct TextFormatter {
    config: TextFormatterConfig,
}

impl TextFormatter {
    pub fn new(config: TextFormatterConfig) -> Self {
        Self { config }
    }
}

impl LogFormatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        // 时间戳 23 字节 + 级别最长 5 字节 + 括号空格 + 颜色转义
        let mut result = String::with_capacity(48 + record.message.len());

        result.push('[');
        write!(result, "{}", record.timestamp.format(TIMESTAMP_FORMAT))?;
        result.push_str("] [");
        result.push_str(record.level.name());
        result.push_str("] ");

        if self.config.colored {
            record.level.decorator().paint_to(&mut result, &record.message);
        } else {
            result.push_str(&record.message);
        }

        Ok(result)
    }
}

crate::impl_from!(TextFormatterConfig => TextFormatter);
crate::impl_box_from!(TextFormatter => dyn LogFormatter);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::LogLevel;
    use chrono::{Local, TimeZone};

    fn fixed_record(level: LogLevel, message: &str) -> LogRecord {
        let ts = Local.with_ymd_and_hms(2025, 1, 19, 12, 34, 56).unwrap()
            + chrono::Duration::milliseconds(789);
        LogRecord::new(level, message).with_timestamp(ts)
    }

    #[test]
    fn test_text_formatter_format() {
        let formatter = TextFormatter::new(TextFormatterConfig { colored: false });
        let formatted = formatter
            .format(&fixed_record(LogLevel::Info, "test message"))
            .unwrap();

        assert_eq!(formatted, "[2025-01-19 12:34:56.789] [INFO] test message");
    }

    #[test]
    fn test_text_formatter_deterministic() {
        let formatter = TextFormatter::new(TextFormatterConfig::default());
        let record = fixed_record(LogLevel::Warn, "y: 5");

        let first = formatter.format(&record).unwrap();
        let second = formatter.format(&record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_formatter_colored() {
        let formatter = TextFormatter::new(TextFormatterConfig { colored: true });
        let formatted = formatter
            .format(&fixed_record(LogLevel::Error, "error message"))
            .unwrap();

        assert_eq!(
            formatted,
            "[2025-01-19 12:34:56.789] [ERROR] \x1b[31merror message\x1b[0m"
        );
    }

    #[test]
    fn test_text_formatter_colored_fatal_is_bold() {
        let formatter = TextFormatter::new(TextFormatterConfig { colored: true });
        let formatted = formatter.format(&fixed_record(LogLevel::Fatal, "boom")).unwrap();

        assert!(formatted.contains("[FATAL] \x1b[1;91mboom\x1b[0m"));
    }

    #[test]
    fn test_text_formatter_config_default() {
        let config = TextFormatterConfig::default();
        assert!(!config.colored);
    }

    #[test]
    fn test_text_formatter_from_config() {
        let formatter = TextFormatter::from(TextFormatterConfig { colored: true });
        assert!(formatter.config.colored);
    }
}
