use anyhow::Result;

/// 日志输出器 trait
///
/// 负责将格式化后的单行日志写到目标介质，换行符由输出器追加
#[async_trait::async_trait]
pub trait LogAppender: Send + Sync {
    /// 输出日志
    async fn append(&self, formatted_message: &str) -> Result<()>;

    /// 刷新缓冲区（默认实现为空操作）
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// 关闭输出器，之后的 append 不再落到介质上（默认实现为 flush）
    async fn close(&self) -> Result<()> {
        self.flush().await
    }
}
