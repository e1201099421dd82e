use crate::log::appender::LogAppender;
use crate::log::error::{report, SinkError};
use crate::log::rotation::{backup_path, compressed_path, RotationPolicy};
use anyhow::Result;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// 文件句柄状态
///
/// 切分期间（Rotating）锁一直被持有，外部只能观察到 Closed 或 Open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// 没有打开的句柄，文件输出处于降级状态
    Closed,
    /// 句柄已打开，可以写入
    Open,
}

/// 一次切分检查的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotateOutcome {
    /// 未达到阈值，文件保持不变
    Unchanged,
    /// 句柄原本处于关闭状态，本次检查重新打开了文件
    Reopened,
    /// 已切分，旧文件被重命名为 backup
    Rotated { backup: PathBuf },
}

/// 文件输出器
///
/// 独占日志文件句柄。写入（append）和切分（maybe_rotate）是仅有的两个会触碰句柄的操作，
/// 二者通过同一把锁串行执行：写入不会落在切分中间，切分也不会在写入中途关闭句柄。
/// 每次写入后都会同步到存储设备。
pub struct FileAppender {
    path: PathBuf,
    file: Mutex<Option<tokio::fs::File>>,
}

impl FileAppender {
    /// 同步构造：创建父目录并以追加模式打开文件
    ///
    /// 失败时向标准错误报告一次，输出器保持 Closed 状态，下一次切分检查会重试
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match open_std(&path) {
            Ok(file) => Some(tokio::fs::File::from_std(file)),
            Err(e) => {
                report(&e);
                None
            }
        };

        Self {
            path,
            file: Mutex::new(file),
        }
    }

    /// 异步构造，语义与 new 相同
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match open_async(&path).await {
            Ok(file) => Some(file),
            Err(e) => {
                report(&e);
                None
            }
        };

        Self {
            path,
            file: Mutex::new(file),
        }
    }

    /// 获取日志文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn state(&self) -> SinkState {
        if self.file.lock().await.is_some() {
            SinkState::Open
        } else {
            SinkState::Closed
        }
    }

    /// 检查阈值，必要时切分
    ///
    /// - Closed：尝试重新打开文件
    /// - Open 且达到大小或时间阈值：关闭、重命名为 `<path>.<时间后缀>`、在原路径重新打开
    ///
    /// 重命名失败时句柄保持关闭，错误返回给调用方报告
    pub async fn maybe_rotate(&self, policy: &RotationPolicy) -> Result<RotateOutcome, SinkError> {
        let mut guard = self.file.lock().await;

        let Some(file) = guard.as_mut() else {
            *guard = Some(open_async(&self.path).await?);
            return Ok(RotateOutcome::Reopened);
        };

        let metadata = file.metadata().await.map_err(|source| SinkError::Stat {
            path: self.path.clone(),
            source,
        })?;
        let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        if policy
            .rotation_reason(metadata.len(), modified, SystemTime::now())
            .is_none()
        {
            return Ok(RotateOutcome::Unchanged);
        }

        // Rotating：先关闭旧句柄
        if let Some(file) = guard.take() {
            close_file(file, &self.path).await?;
        }

        let backup = unique_backup_path(&self.path).await;
        tokio::fs::rename(&self.path, &backup)
            .await
            .map_err(|source| SinkError::Rename {
                from: self.path.clone(),
                to: backup.clone(),
                source,
            })?;

        *guard = Some(open_async(&self.path).await?);
        Ok(RotateOutcome::Rotated { backup })
    }

    async fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut guard = self.file.lock().await;
        let Some(file) = guard.as_mut() else {
            eprintln!("log file not initialized: {}", line);
            return Ok(());
        };

        let map_err = |source| SinkError::Write {
            path: self.path.clone(),
            source,
        };
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        file.write_all(buf.as_bytes()).await.map_err(map_err)?;
        file.flush().await.map_err(map_err)?;
        file.sync_all().await.map_err(map_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LogAppender for FileAppender {
    async fn append(&self, formatted_message: &str) -> Result<()> {
        Ok(self.write_line(formatted_message).await?)
    }

    async fn flush(&self) -> Result<()> {
        let mut guard = self.file.lock().await;
        if let Some(file) = guard.as_mut() {
            file.flush().await?;
            file.sync_all().await?;
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.file.lock().await;
        if let Some(file) = guard.take() {
            close_file(file, &self.path).await?;
        }
        Ok(())
    }
}

/// 刷新并同步后释放句柄，返回时底层文件描述符已关闭
async fn close_file(mut file: tokio::fs::File, path: &Path) -> Result<(), SinkError> {
    let map_err = |source| SinkError::Write {
        path: path.to_path_buf(),
        source,
    };
    file.flush().await.map_err(map_err)?;
    file.sync_all().await.map_err(map_err)?;
    drop(file.into_std().await);
    Ok(())
}

/// 同一秒内多次切分时在后缀后追加序号，避免覆盖已有备份
///
/// 已被压缩的备份（`<候选名>.gz`）同样视为占用
async fn unique_backup_path(path: &Path) -> PathBuf {
    let base = backup_path(path, Local::now());
    let mut candidate = base.clone();
    let mut seq = 1;
    while backup_name_taken(&candidate).await {
        candidate = PathBuf::from(format!("{}.{}", base.display(), seq));
        seq += 1;
    }
    candidate
}

async fn backup_name_taken(candidate: &Path) -> bool {
    let compressed = compressed_path(candidate);
    tokio::fs::try_exists(candidate).await.unwrap_or(false)
        || tokio::fs::try_exists(&compressed).await.unwrap_or(false)
}

fn open_std(path: &Path) -> Result<std::fs::File, SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SinkError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })
}

async fn open_async(path: &Path) -> Result<tokio::fs::File, SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| SinkError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })
}
