//! 日志宏
//!
//! 宏接收格式化模板和参数，级别被过滤时不会执行格式化
//!
//! # 示例
//!
//! ```ignore
//! use rotlog::{info, warn};
//!
//! let logger = Logger::new(Config::from_env());
//! info!(logger, "listening on {}", addr);
//! warn!(logger, "retry {}/{}", attempt, max_attempts);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger
                .log($crate::log::LogRecord::new(level, ::std::format!($($arg)+)))
                .await
        } else {
            $crate::log::Emit::Filtered
        }
    }};
}

/// 记录 DEBUG 级别日志
///
/// ```ignore
/// debug!(logger, "processing request {}", request_id);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_at!($logger, $crate::log::LogLevel::Debug, $($arg)+)
    };
}

/// 记录 INFO 级别日志
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_at!($logger, $crate::log::LogLevel::Info, $($arg)+)
    };
}

/// 记录 WARN 级别日志
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_at!($logger, $crate::log::LogLevel::Warn, $($arg)+)
    };
}

/// 记录 ERROR 级别日志
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_at!($logger, $crate::log::LogLevel::Error, $($arg)+)
    };
}

/// 记录 FATAL 级别日志，返回 `Shutdown`
///
/// ```ignore
/// fatal!(logger, "cannot bind {}", addr).exit();
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(::std::format!($($arg)+)).await
    };
}
