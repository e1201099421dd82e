use crate::log::formatter::LogFormatter;
use crate::log::log_record::LogRecord;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// JsonFormatter 配置（保留扩展性）
#[derive(Debug, Clone, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct JsonFormatterConfig {}

/// 单行 JSON 的字段顺序固定为 time、level、message
#[derive(Serialize)]
struct JsonLine<'a> {
    time: &'a str,
    level: &'a str,
    message: &'a str,
}

/// JSON 格式化器
///
/// 输出形如 `{"time":"2025-01-19 12:34:56.789","level":"INFO","message":"..."}`，
/// 消息中的引号和控制字符会被转义
pub struct JsonFormatter {}

impl JsonFormatter {
    pub fn new(_: JsonFormatterConfig) -> Self {
        Self {}
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let time = record.formatted_timestamp();
        let line = JsonLine {
            time: &time,
            level: record.level.name(),
            message: &record.message,
        };
        Ok(serde_json::to_string(&line)?)
    }
}

crate::impl_from!(JsonFormatterConfig => JsonFormatter);
crate::impl_box_from!(JsonFormatter => dyn LogFormatter);

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
    fn test_json_formatter_format() {
        let formatter = JsonFormatter::new(JsonFormatterConfig::default());
        let formatted = formatter
            .format(&fixed_record(LogLevel::Info, "test message"))
            .unwrap();

        assert_eq!(
            formatted,
            r#"{"time":"2025-01-19 12:34:56.789","level":"INFO","message":"test message"}"#
        );
    }

    #[test]
    fn test_json_formatter_escapes_message() {
        let formatter = JsonFormatter::new(JsonFormatterConfig::default());
        let formatted = formatter
            .format(&fixed_record(LogLevel::Error, "say \"hi\"\nnext"))
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["message"], "say \"hi\"\nnext");
        assert!(!formatted.contains('\n'));
    }

    #[test]
    fn test_json_formatter_deterministic() {
        let formatter = JsonFormatter::new(JsonFormatterConfig::default());
        let record = fixed_record(LogLevel::Debug, "same");

        assert_eq!(formatter.format(&record).unwrap(), formatter.format(&record).unwrap());
    }

    #[test]
    fn test_json_formatter_from_config() {
        let config = JsonFormatterConfig::default();
        let _ = JsonFormatter::from(config);
    }
}
