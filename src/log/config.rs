//! 日志配置
//!
//! 支持从环境变量、JSON5、YAML、TOML 加载。无法识别的取值会被静默替换为默认值，
//! 配置问题不会成为调用方可见的错误。

use crate::cfg::serde_duration::{serde_as, HumanDur};
use crate::log::level::LogLevel;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// 一兆字节
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Format {
    /// `[时间] [级别] 消息`
    Text,
    /// 单行 JSON
    Json,
    /// 与 Text 相同，消息部分带级别颜色
    #[default]
    Color,
}

impl FromStr for Format {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Format::Text,
            "json" => Format::Json,
            _ => Format::Color,
        })
    }
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// 输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Destination {
    /// 标准输出
    #[default]
    Stdout,
    /// 仅文件
    File,
    /// 标准输出和文件
    Both,
}

impl Destination {
    pub fn includes_console(&self) -> bool {
        matches!(self, Destination::Stdout | Destination::Both)
    }

    pub fn includes_file(&self) -> bool {
        matches!(self, Destination::File | Destination::Both)
    }
}

impl FromStr for Destination {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "file" => Destination::File,
            "both" => Destination::Both,
            _ => Destination::Stdout,
        })
    }
}

impl From<String> for Destination {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// Logger 配置
///
/// 构造 Logger 后不再变化。数值阈值为 0 或负数时关闭对应功能。
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// 最低输出级别
    #[default(LogLevel::Info)]
    pub level: LogLevel,

    /// 输出格式
    pub format: Format,

    /// 输出目标
    #[serde(alias = "destination")]
    pub output: Destination,

    /// 日志文件路径，输出到文件时必须非空
    pub file_path: String,

    /// 单个文件最大大小（MB）
    #[default = 100]
    pub max_size_mb: i64,

    /// 文件最长保留天数（按最后修改时间）
    #[default = 30]
    pub max_age_days: i64,

    /// 保留的备份文件数量
    #[default = 3]
    pub max_backups: i64,

    /// 切分检查周期
    #[default(Duration::from_secs(60))]
    #[serde_as(as = "HumanDur")]
    pub check_interval: Duration,

    /// 是否用 gzip 压缩切分出的备份
    #[default = false]
    pub compress: bool,

    /// 强制开启或关闭颜色，None 表示按终端自动检测
    #[default(None)]
    pub force_color: Option<bool>,
}

impl Config {
    /// 从进程环境变量读取配置
    ///
    /// | 变量 | 含义 |
    /// |---|---|
    /// | LOG_LEVEL | 最低级别 |
    /// | LOG_FORMAT | text / json / color |
    /// | LOG_OUTPUT | stdout / file / both |
    /// | LOG_FILE_PATH | 日志文件路径 |
    /// | LOG_FILE_MAX_SIZE | 最大大小（MB） |
    /// | LOG_FILE_MAX_AGE | 最长保留天数 |
    /// | LOG_FILE_MAX_BACKUPS | 备份数量 |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意键值查找函数读取配置，未设置或为空的键保留默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(level) = get("LOG_LEVEL") {
            config.level = LogLevel::from(level);
        }
        if let Some(format) = get("LOG_FORMAT") {
            config.format = Format::from(format);
        }
        if let Some(output) = get("LOG_OUTPUT") {
            config.output = Destination::from(output);
        }
        if let Some(path) = get("LOG_FILE_PATH") {
            config.file_path = path;
        }
        // 数值无法解析时保留默认值
        if let Some(size) = get("LOG_FILE_MAX_SIZE").and_then(|v| v.trim().parse().ok()) {
            config.max_size_mb = size;
        }
        if let Some(age) = get("LOG_FILE_MAX_AGE").and_then(|v| v.trim().parse().ok()) {
            config.max_age_days = age;
        }
        if let Some(backups) = get("LOG_FILE_MAX_BACKUPS").and_then(|v| v.trim().parse().ok()) {
            config.max_backups = backups;
        }

        config
    }

    /// 从 JSON 字符串创建配置（支持 JSON5 格式）
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(json5::from_str(json_str)?)
    }

    /// 从 YAML 字符串创建配置
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    /// 从 TOML 字符串创建配置
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// 是否真正启用文件输出（路径为空时退化为仅控制台）
    pub fn file_enabled(&self) -> bool {
        self.output.includes_file() && !self.file_path.trim().is_empty()
    }

    pub fn console_enabled(&self) -> bool {
        self.output.includes_console()
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.file_enabled().then(|| PathBuf::from(&self.file_path))
    }

    /// 按大小切分的阈值（字节）
    pub fn max_size_bytes(&self) -> Option<u64> {
        positive(self.max_size_mb).map(|mb| mb.saturating_mul(BYTES_PER_MB))
    }

    /// 按时间切分的阈值
    pub fn max_age(&self) -> Option<Duration> {
        positive(self.max_age_days).map(|days| Duration::from_secs(days.saturating_mul(86_400)))
    }

    pub fn max_backups(&self) -> Option<usize> {
        positive(self.max_backups).map(|n| n as usize)
    }
}

fn positive(value: i64) -> Option<u64> {
    (value > 0).then_some(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, Format::Color);
        assert_eq!(config.output, Destination::Stdout);
        assert_eq!(config.file_path, "");
        assert_eq!(config.max_size_mb, 100);
        assert_eq!(config.max_age_days, 30);
        assert_eq!(config.max_backups, 3);
        assert_eq!(config.check_interval, Duration::from_secs(60));
        assert!(!config.compress);
        assert_eq!(config.force_color, None);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            ("LOG_LEVEL", "warn"),
            ("LOG_FORMAT", "json"),
            ("LOG_OUTPUT", "both"),
            ("LOG_FILE_PATH", "/var/log/app.log"),
            ("LOG_FILE_MAX_SIZE", "10"),
            ("LOG_FILE_MAX_AGE", "0"),
            ("LOG_FILE_MAX_BACKUPS", "7"),
        ]));

        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.output, Destination::Both);
        assert_eq!(config.file_path, "/var/log/app.log");
        assert_eq!(config.max_size_bytes(), Some(10 * BYTES_PER_MB));
        assert_eq!(config.max_age(), None);
        assert_eq!(config.max_backups(), Some(7));
    }

    #[test]
    fn test_config_from_lookup_invalid_values_keep_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("LOG_LEVEL", "verbose"),
            ("LOG_FORMAT", "xml"),
            ("LOG_OUTPUT", "syslog"),
            ("LOG_FILE_MAX_SIZE", "big"),
            ("LOG_FILE_MAX_BACKUPS", ""),
        ]));

        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, Format::Color);
        assert_eq!(config.output, Destination::Stdout);
        assert_eq!(config.max_size_mb, 100);
        assert_eq!(config.max_backups, 3);
    }

    #[test]
    fn test_file_enabled_requires_path() {
        let mut config = Config {
            output: Destination::File,
            ..Default::default()
        };
        assert!(!config.file_enabled());
        assert!(!config.console_enabled());
        assert_eq!(config.file_path(), None);

        config.file_path = "app.log".to_string();
        assert!(config.file_enabled());
        assert_eq!(config.file_path(), Some(PathBuf::from("app.log")));
    }

    #[test]
    fn test_negative_thresholds_disable() {
        let config = Config {
            max_size_mb: -1,
            max_age_days: -5,
            max_backups: 0,
            ..Default::default()
        };
        assert_eq!(config.max_size_bytes(), None);
        assert_eq!(config.max_age(), None);
        assert_eq!(config.max_backups(), None);
    }

    #[test]
    fn test_config_from_json5() -> Result<()> {
        let config = Config::from_json(
            r#"
            {
                // JSON5 允许注释
                level: "debug",
                format: "text",
                output: "file",
                file_path: "logs/app.log",
                max_backups: 5,
                check_interval: "30s",
            }
            "#,
        )?;

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, Format::Text);
        assert_eq!(config.output, Destination::File);
        assert_eq!(config.max_backups, 5);
        assert_eq!(config.check_interval, Duration::from_secs(30));
        assert_eq!(config.max_size_mb, 100);
        Ok(())
    }

    #[test]
    fn test_config_loader_rejects_oversized_interval() {
        let result = Config::from_json(r#"{check_interval: "99999999999999999999999d"}"#);
        assert!(result.is_err());
        assert!(Config::from_yaml("check_interval: 99999999999999999999999d").is_err());
    }

    #[test]
    fn test_config_from_yaml() -> Result<()> {
        let config = Config::from_yaml(
            r#"
level: ERROR
format: json
destination: both
file_path: /tmp/app.log
check_interval: 2m
"#,
        )?;

        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.output, Destination::Both);
        assert_eq!(config.check_interval, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn test_config_from_toml() -> Result<()> {
        let config = Config::from_toml(
            r#"
level = "nonsense"
format = "color"
max_size_mb = 1
compress = true
"#,
        )?;

        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, Format::Color);
        assert_eq!(config.max_size_bytes(), Some(BYTES_PER_MB));
        assert!(config.compress);
        Ok(())
    }
}
