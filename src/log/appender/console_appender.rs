use crate::log::appender::LogAppender;
use anyhow::Result;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// 终端输出器
///
/// 默认写到标准输出；也可以接入任意 Write，便于嵌入方捕获输出
pub struct ConsoleAppender {
    out: Mutex<Box<dyn Write + Send>>,
    is_terminal: bool,
}

impl ConsoleAppender {
    /// 输出到标准输出
    pub fn stdout() -> Self {
        Self {
            out: Mutex::new(Box::new(io::stdout())),
            is_terminal: io::stdout().is_terminal(),
        }
    }

    /// 输出到指定 writer，视为非终端
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            is_terminal: false,
        }
    }

    /// 目标是否为支持颜色的终端
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::stdout()
    }
}

#[async_trait::async_trait]
impl LogAppender for ConsoleAppender {
    async fn append(&self, formatted_message: &str) -> Result<()> {
        let mut out = self.lock();
        writeln!(out, "{}", formatted_message)?;
        out.flush()?;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.lock().flush()?;
        Ok(())
    }
}

/// 可共享的内存缓冲区
///
/// 克隆后指向同一块内存，配合 `ConsoleAppender::from_writer` 读取已输出的内容
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// 按行拆分已输出的内容
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
