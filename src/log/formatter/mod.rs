mod core;
mod json_formatter;
mod text_formatter;

pub use self::core::LogFormatter;
pub use json_formatter::{JsonFormatter, JsonFormatterConfig};
pub use text_formatter::{TextFormatter, TextFormatterConfig};

use crate::log::config::Format;

/// 根据输出格式创建 Formatter
///
/// `colorize` 只对 Color 格式生效，为 false 时颜色装饰器退化为空操作
pub fn create_formatter(format: Format, colorize: bool) -> Box<dyn LogFormatter> {
    match format {
        Format::Json => Box::new(JsonFormatter::new(JsonFormatterConfig::default())),
        Format::Text => Box::new(TextFormatter::new(TextFormatterConfig { colored: false })),
        Format::Color => Box::new(TextFormatter::new(TextFormatterConfig { colored: colorize })),
    }
}
