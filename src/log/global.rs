//! 进程级全局 Logger
//!
//! 默认是一个只输出到终端的 Logger，调用 `init` 后替换为按配置创建的 Logger

use crate::log::config::Config;
use crate::log::error::report;
use crate::log::level::LogLevel;
use crate::log::log_record::LogRecord;
use crate::log::logger::Logger;
use anyhow::{anyhow, Result};
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

static GLOBAL_LOGGER: Lazy<ArcSwap<Logger>> =
    Lazy::new(|| ArcSwap::from_pointee(Logger::new(Config::default())));

/// 初始化全局 Logger
///
/// 重复初始化时会关闭之前 Logger 的文件句柄并停止其切分任务
///
/// # 示例
///
/// ```ignore
/// let config = Config::from_yaml("level: debug\noutput: both\nfile_path: /var/log/app.log")?;
/// rotlog::log::init(config).await;
/// rotlog::log::info("service started").await;
/// ```
pub async fn init(config: Config) -> Arc<Logger> {
    let logger = Arc::new(Logger::new(config));
    let previous = GLOBAL_LOGGER.swap(logger.clone());
    previous.close().await;
    logger
}

/// 从 LOG_* 环境变量初始化全局 Logger
pub async fn init_from_env() -> Arc<Logger> {
    init(Config::from_env()).await
}

/// 获取全局 Logger
pub fn logger() -> Arc<Logger> {
    GLOBAL_LOGGER.load_full()
}

pub async fn debug(message: impl Into<String>) {
    let _ = logger().debug(message).await;
}

pub async fn info(message: impl Into<String>) {
    let _ = logger().info(message).await;
}

pub async fn warn(message: impl Into<String>) {
    let _ = logger().warn(message).await;
}

pub async fn error(message: impl Into<String>) {
    let _ = logger().error(message).await;
}

/// 记录 FATAL 日志，关闭文件后以状态码 1 退出进程
pub async fn fatal(message: impl Into<String>) -> ! {
    logger().fatal(message).await.exit()
}

/// 将全局 Logger 注册为 `log` crate 的后端
///
/// 需要在 tokio 运行时内调用；每个进程只能注册一次。
/// 桥接的日志经由通道交给后台任务按顺序写出，调用 `log::info!` 等宏的线程不会阻塞。
pub fn install_log_bridge() -> Result<()> {
    let handle = Handle::try_current()
        .map_err(|e| anyhow!("log bridge requires a tokio runtime: {}", e))?;
    let (sender, receiver) = mpsc::unbounded_channel();
    ::log::set_boxed_logger(Box::new(LogBridge { sender }))?;
    ::log::set_max_level(::log::LevelFilter::Trace);
    handle.spawn(run_log_bridge(receiver));
    Ok(())
}

enum BridgeMessage {
    Record(LogRecord),
    Flush,
}

/// 按接收顺序把桥接的日志写到当前的全局 Logger
async fn run_log_bridge(mut receiver: mpsc::UnboundedReceiver<BridgeMessage>) {
    while let Some(message) = receiver.recv().await {
        match message {
            BridgeMessage::Record(record) => {
                let _ = logger().log(record).await;
            }
            BridgeMessage::Flush => logger().flush().await,
        }
    }
}

/// `log` crate 到全局 Logger 的桥接
struct LogBridge {
    sender: mpsc::UnboundedSender<BridgeMessage>,
}

impl LogBridge {
    fn send(&self, message: BridgeMessage) {
        if self.sender.send(message).is_err() {
            report(&"log bridge writer stopped, record dropped");
        }
    }
}

impl ::log::Log for LogBridge {
    fn enabled(&self, metadata: &::log::Metadata) -> bool {
        logger().enabled(metadata.level().into())
    }

    fn log(&self, record: &::log::Record) {
        let level = LogLevel::from(record.level());
        if !logger().enabled(level) {
            return;
        }
        self.send(BridgeMessage::Record(LogRecord::new(
            level,
            record.args().to_string(),
        )));
    }

    fn flush(&self) {
        self.send(BridgeMessage::Flush);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::appender::SinkState;
    use crate::log::config::{Destination, Format};
    use serial_test::serial;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, name: &str) -> Config {
        Config {
            level: LogLevel::Debug,
            format: Format::Text,
            output: Destination::File,
            file_path: dir.path().join(name).to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_global_init_replaces_logger() {
        let temp_dir = TempDir::new().unwrap();

        let installed = init(file_config(&temp_dir, "global.log")).await;
        assert!(Arc::ptr_eq(&installed, &logger()));
        assert_eq!(logger().level(), LogLevel::Debug);

        debug("global debug").await;
        info("global info").await;
        warn("global warn").await;
        error("global error").await;

        let contents = std::fs::read_to_string(temp_dir.path().join("global.log")).unwrap();
        assert_eq!(contents.lines().count(), 4);
        assert!(contents.contains("[ERROR] global error"));

        init(Config::default()).await;
    }

    #[tokio::test]
    #[serial]
    async fn test_global_reinit_closes_previous_file() {
        let temp_dir = TempDir::new().unwrap();

        let first = init(file_config(&temp_dir, "first.log")).await;
        let second = init(file_config(&temp_dir, "second.log")).await;

        assert!(first.is_shut_down());
        assert_eq!(
            first.file_appender().unwrap().state().await,
            SinkState::Closed
        );
        assert_eq!(
            second.file_appender().unwrap().state().await,
            SinkState::Open
        );

        info("after reinit").await;
        let first_contents = std::fs::read_to_string(temp_dir.path().join("first.log")).unwrap();
        let second_contents = std::fs::read_to_string(temp_dir.path().join("second.log")).unwrap();
        assert!(first_contents.is_empty());
        assert!(second_contents.contains("after reinit"));

        init(Config::default()).await;
    }

    /// 轮询直到文件内容满足条件，最多等待约 10 秒
    async fn wait_for_file(path: &std::path::Path, done: impl Fn(&str) -> bool) -> String {
        for _ in 0..500 {
            let contents = std::fs::read_to_string(path).unwrap_or_default();
            if done(&contents) {
                return contents;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        std::fs::read_to_string(path).unwrap_or_default()
    }

    #[tokio::test]
    #[serial]
    async fn test_log_bridge_on_current_thread_runtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bridge.log");
        init(file_config(&temp_dir, "bridge.log")).await;

        install_log_bridge().unwrap();
        assert!(install_log_bridge().is_err());

        // 另一个任务持续写文件，与桥接的日志竞争同一把文件锁
        let writer = tokio::spawn(async {
            for i in 0..200 {
                info(format!("direct {}", i)).await;
            }
        });
        for i in 0..200 {
            tokio::task::yield_now().await;
            ::log::info!("bridged {}", i);
        }
        ::log::trace!("trace maps to debug");
        ::log::logger().flush();

        tokio::time::timeout(std::time::Duration::from_secs(20), writer)
            .await
            .expect("direct writer finished")
            .unwrap();
        let contents = wait_for_file(&path, |c| c.contains("trace maps to debug")).await;

        assert_eq!(contents.lines().filter(|l| l.contains("[INFO] bridged ")).count(), 200);
        assert_eq!(contents.lines().filter(|l| l.contains("[INFO] direct ")).count(), 200);
        assert!(contents.contains("[INFO] bridged 7\n"));
        assert!(contents.contains("[DEBUG] trace maps to debug"));

        logger().set_level(LogLevel::Error);
        ::log::warn!("filtered by bridge");
        ::log::error!("bridge marker");
        let contents = wait_for_file(&path, |c| c.contains("bridge marker")).await;
        assert!(!contents.contains("filtered by bridge"));

        init(Config::default()).await;
    }
}
