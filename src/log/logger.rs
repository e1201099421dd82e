use crate::log::appender::{ConsoleAppender, FileAppender, LogAppender, RotateOutcome};
use crate::log::config::Config;
use crate::log::error::report;
use crate::log::formatter::{create_formatter, LogFormatter};
use crate::log::level::LogLevel;
use crate::log::log_record::LogRecord;
use crate::log::rotation::{RotationHandle, RotationManager, RotationPolicy};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// FATAL 日志之后的退出码
pub const FATAL_EXIT_CODE: i32 = 1;

/// 进程终止请求
///
/// FATAL 日志写出并关闭文件后返回给调用方，由调用方决定何时调用 `exit`
#[must_use = "a FATAL log requests process termination; call `exit()` or handle the shutdown explicitly"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shutdown {
    code: i32,
}

impl Shutdown {
    pub fn code(&self) -> i32 {
        self.code
    }

    /// 以非零状态码终止进程
    pub fn exit(self) -> ! {
        std::process::exit(self.code)
    }
}

/// 一次日志调用的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// 低于最低级别，没有格式化也没有 I/O
    Filtered,
    /// 已写到所有输出目标
    Written,
    /// FATAL：已写出并关闭文件，请求终止进程
    Shutdown(Shutdown),
}

/// 核心日志器
///
/// 负责日志的级别控制、格式化和输出，并持有后台切分任务。
/// 记录日志的调用不会返回错误，输出失败只报告到标准错误流。
pub struct Logger {
    config: Config,
    level: AtomicU8,
    formatter: Box<dyn LogFormatter>,
    appenders: Vec<Arc<dyn LogAppender>>,
    file: Option<Arc<FileAppender>>,
    rotation: Option<RotationHandle>,
    shut_down: AtomicBool,
}

impl Logger {
    /// 从配置创建 Logger，控制台输出到标准输出
    pub fn new(config: Config) -> Self {
        Self::with_console(config, ConsoleAppender::stdout())
    }

    /// 从配置创建 Logger，控制台输出到指定的 ConsoleAppender
    ///
    /// 输出到文件时需要在 tokio 运行时内调用，否则不会启动后台切分
    pub fn with_console(config: Config, console: ConsoleAppender) -> Self {
        let colorize = config.force_color.unwrap_or_else(|| console.is_terminal());
        let formatter = create_formatter(config.format, colorize);

        let mut appenders: Vec<Arc<dyn LogAppender>> = Vec::new();
        // 文件路径为空时退化为仅控制台
        if config.console_enabled() || !config.file_enabled() {
            appenders.push(Arc::new(console));
        }

        let mut file = None;
        let mut rotation = None;
        if let Some(path) = config.file_path() {
            let appender = Arc::new(FileAppender::new(path));
            let manager = RotationManager::new(
                appender.clone(),
                RotationPolicy::from_config(&config),
                config.check_interval,
            );
            rotation = manager.spawn();
            if rotation.is_none() {
                report(&"no tokio runtime available, log rotation disabled");
            }
            appenders.push(appender.clone());
            file = Some(appender);
        }

        Self {
            level: AtomicU8::new(config.level.as_u8()),
            config,
            formatter,
            appenders,
            file,
            rotation,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 获取当前日志级别
    pub fn level(&self) -> LogLevel {
        LogLevel::try_from(self.level.load(Ordering::Relaxed)).unwrap_or(LogLevel::Info)
    }

    /// 设置日志级别
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// 该级别的日志是否会被输出
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.as_u8() >= self.level.load(Ordering::Relaxed)
    }

    /// 文件输出器（仅在启用文件输出时存在）
    pub fn file_appender(&self) -> Option<&Arc<FileAppender>> {
        self.file.as_ref()
    }

    /// 后台切分任务是否在运行
    pub fn rotation_running(&self) -> bool {
        self.rotation.as_ref().is_some_and(|h| h.is_running())
    }

    /// 立即执行一次切分检查，不等待后台周期
    pub async fn rotate_now(&self) -> Option<RotateOutcome> {
        let file = self.file.as_ref()?;
        let manager = RotationManager::new(
            file.clone(),
            RotationPolicy::from_config(&self.config),
            self.config.check_interval,
        );
        Some(manager.tick().await)
    }

    /// 是否已因 FATAL 或 close 关闭
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// 记录日志
    pub async fn log(&self, record: LogRecord) -> Emit {
        if !self.enabled(record.level) {
            return Emit::Filtered;
        }

        let line = match self.formatter.format(&record) {
            Ok(line) => line,
            Err(e) => {
                report(&e);
                record.message.clone()
            }
        };

        for appender in &self.appenders {
            if let Err(e) = appender.append(&line).await {
                report(&e);
            }
        }

        if record.level == LogLevel::Fatal {
            self.close().await;
            return Emit::Shutdown(Shutdown {
                code: FATAL_EXIT_CODE,
            });
        }

        Emit::Written
    }

    async fn log_message(&self, level: LogLevel, message: impl Into<String>) -> Emit {
        if !self.enabled(level) {
            return Emit::Filtered;
        }
        self.log(LogRecord::new(level, message)).await
    }

    /// 记录 DEBUG 级别日志
    pub async fn debug(&self, message: impl Into<String>) -> Emit {
        self.log_message(LogLevel::Debug, message).await
    }

    /// 记录 INFO 级别日志
    pub async fn info(&self, message: impl Into<String>) -> Emit {
        self.log_message(LogLevel::Info, message).await
    }

    /// 记录 WARN 级别日志
    pub async fn warn(&self, message: impl Into<String>) -> Emit {
        self.log_message(LogLevel::Warn, message).await
    }

    /// 记录 ERROR 级别日志
    pub async fn error(&self, message: impl Into<String>) -> Emit {
        self.log_message(LogLevel::Error, message).await
    }

    /// 记录 FATAL 级别日志
    ///
    /// 写出后关闭文件句柄并返回 Shutdown，调用方应随后终止进程
    pub async fn fatal(&self, message: impl Into<String>) -> Shutdown {
        match self.log(LogRecord::new(LogLevel::Fatal, message)).await {
            Emit::Shutdown(shutdown) => shutdown,
            _ => Shutdown {
                code: FATAL_EXIT_CODE,
            },
        }
    }

    /// 刷新所有输出器
    pub async fn flush(&self) {
        for appender in &self.appenders {
            if let Err(e) = appender.flush().await {
                report(&e);
            }
        }
    }

    /// 停止后台切分，刷新并关闭所有输出器
    ///
    /// 可以重复调用；关闭后文件输出的日志会被报告到标准错误流
    pub async fn close(&self) {
        self.shut_down.store(true, Ordering::Release);
        if let Some(rotation) = &self.rotation {
            rotation.stop();
        }
        for appender in &self.appenders {
            if let Err(e) = appender.close().await {
                report(&e);
            }
        }
    }
}

impl From<Config> for Logger {
    fn from(config: Config) -> Self {
        Logger::new(config)
    }
}
