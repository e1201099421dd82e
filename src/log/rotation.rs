//! 日志切分
//!
//! RotationManager 在后台按固定周期检查活动文件的大小和最后修改时间，
//! 达到阈值时切分，并按最后修改时间清理超出数量的旧备份。
//! 切分永远不在记录日志的调用路径上执行。

use crate::log::appender::{FileAppender, RotateOutcome};
use crate::log::config::Config;
use crate::log::error::{report, SinkError};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;

/// 备份文件时间后缀格式：2025-01-19T12-34-56
pub const BACKUP_SUFFIX_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// 默认检查周期
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// 切分原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateReason {
    Size,
    Age,
}

/// 切分与清理策略，None 表示关闭对应功能
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotationPolicy {
    /// 文件大小阈值（字节）
    pub max_size_bytes: Option<u64>,
    /// 最后修改时间阈值
    pub max_age: Option<Duration>,
    /// 保留的备份数量
    pub max_backups: Option<usize>,
    /// 是否压缩备份
    pub compress: bool,
}

impl RotationPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_size_bytes: config.max_size_bytes(),
            max_age: config.max_age(),
            max_backups: config.max_backups(),
            compress: config.compress,
        }
    }

    /// 按顺序检查大小和时间阈值，任一满足即需要切分
    pub fn rotation_reason(
        &self,
        size: u64,
        modified: SystemTime,
        now: SystemTime,
    ) -> Option<RotateReason> {
        if self.max_size_bytes.is_some_and(|max| size >= max) {
            return Some(RotateReason::Size);
        }
        let age = now.duration_since(modified).unwrap_or_default();
        if self.max_age.is_some_and(|max| age >= max) {
            return Some(RotateReason::Age);
        }
        None
    }
}

/// 备份路径：`<path>.<时间后缀>`
pub fn backup_path(path: &Path, now: DateTime<Local>) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(now.format(BACKUP_SUFFIX_FORMAT).to_string());
    PathBuf::from(name)
}

/// 列出 `<文件名>.*` 形式的备份（不含活动文件本身和目录）
pub async fn list_backups(path: &Path) -> Result<Vec<(PathBuf, SystemTime)>, SinkError> {
    let dir = log_dir(path);
    let Some(base_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}.", base_name);

    let read_dir_err = |source| SinkError::ReadDir {
        path: dir.clone(),
        source,
    };
    let mut backups = Vec::new();
    let mut entries = tokio::fs::read_dir(&dir).await.map_err(read_dir_err)?;
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        backups.push((entry.path(), modified));
    }

    Ok(backups)
}

/// 保留最近修改的 max_backups 个备份，删除其余的
///
/// 排序依据是最后修改时间（相同时按名称和 `.N` 序号数值），而不是目录遍历顺序或文件名的字典序。
/// 删除失败逐个报告后跳过，返回实际删除的文件。
pub async fn cleanup_backups(path: &Path, max_backups: usize) -> Vec<PathBuf> {
    let mut backups = match list_backups(path).await {
        Ok(backups) => backups,
        Err(e) => {
            report(&e);
            return Vec::new();
        }
    };
    if backups.len() <= max_backups {
        return Vec::new();
    }

    // 最新的在前
    backups.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| backup_order_key(&b.0).cmp(&backup_order_key(&a.0)))
    });

    let mut removed = Vec::new();
    for (backup, _) in backups.into_iter().skip(max_backups) {
        match tokio::fs::remove_file(&backup).await {
            Ok(()) => removed.push(backup),
            Err(source) => report(&SinkError::Remove {
                path: backup,
                source,
            }),
        }
    }
    removed
}

/// gzip 压缩备份，成功后删除原文件，返回 `.gz` 路径
///
/// 压缩后的文件保留原备份的修改时间，保证清理顺序不变
pub async fn compress_backup(path: &Path) -> Result<PathBuf, SinkError> {
    let compressed_path = compressed_path(path);
    let compress_err = |source| SinkError::Compress {
        path: path.to_path_buf(),
        source,
    };

    let content = tokio::fs::read(path).await.map_err(compress_err)?;
    let modified = tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .ok();

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&content).map_err(compress_err)?;
    let compressed = encoder.finish().map_err(compress_err)?;

    // 目标已存在时失败，不覆盖已有的压缩备份
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&compressed_path)
        .await
        .map_err(compress_err)?;
    file.write_all(&compressed).await.map_err(compress_err)?;
    file.sync_all().await.map_err(compress_err)?;
    let file = file.into_std().await;
    if let Some(modified) = modified {
        file.set_modified(modified).map_err(compress_err)?;
    }
    drop(file);
    tokio::fs::remove_file(path)
        .await
        .map_err(|source| SinkError::Remove {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(compressed_path)
}

/// 压缩备份路径：`<path>.gz`
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// 备份的排序键：去掉 `.gz` 与 `.N` 序号后的名称，以及序号本身
///
/// 同一秒内的备份按序号数值比较，`.10` 比 `.9` 新
fn backup_order_key(path: &Path) -> (String, u64) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    match name.rsplit_once('.') {
        Some((stem, seq)) if !seq.is_empty() && seq.bytes().all(|b| b.is_ascii_digit()) => {
            (stem.to_string(), seq.parse().unwrap_or(u64::MAX))
        }
        _ => (name.to_string(), 0),
    }
}

fn log_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// 后台切分管理器
pub struct RotationManager {
    appender: Arc<FileAppender>,
    policy: RotationPolicy,
    interval: Duration,
}

impl RotationManager {
    /// interval 为 0 时使用 DEFAULT_CHECK_INTERVAL
    pub fn new(appender: Arc<FileAppender>, policy: RotationPolicy, interval: Duration) -> Self {
        Self {
            appender,
            policy,
            interval: if interval.is_zero() {
                DEFAULT_CHECK_INTERVAL
            } else {
                interval
            },
        }
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// 执行一次检查：必要时切分，切分成功后压缩并清理旧备份
    ///
    /// 所有文件系统错误都只报告到标准错误流
    pub async fn tick(&self) -> RotateOutcome {
        let outcome = match self.appender.maybe_rotate(&self.policy).await {
            Ok(outcome) => outcome,
            Err(e) => {
                report(&e);
                return RotateOutcome::Unchanged;
            }
        };

        if let RotateOutcome::Rotated { backup } = &outcome {
            if self.policy.compress {
                if let Err(e) = compress_backup(backup).await {
                    report(&e);
                }
            }
            if let Some(max_backups) = self.policy.max_backups {
                cleanup_backups(self.appender.path(), max_backups).await;
            }
        }

        outcome
    }

    /// 在当前 tokio 运行时上启动周期检查
    ///
    /// 没有运行时时返回 None，此时不会进行切分
    pub fn spawn(self) -> Option<RotationHandle> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // 第一次 tick 立即完成，跳过
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        });
        Some(RotationHandle { task })
    }
}

/// 后台切分任务句柄，drop 时停止任务
pub struct RotationHandle {
    task: JoinHandle<()>,
}

impl RotationHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RotationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
