//! 多写者共享的结果集合与失败日志。
//!
//! 任意数量的遍历任务并发写入，调用方无需额外加锁；搜索结束时由协调器
//! 一次性取出。

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{AccessFailure, FailureKind};
use crate::types::FileMatch;

/// 一次搜索的结果集合，只追加
#[derive(Debug, Default)]
pub struct ResultSet {
    items: Mutex<Vec<FileMatch>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 批量写入，一个目录的命中只加一次锁
    pub fn extend(&self, batch: Vec<FileMatch>) {
        if batch.is_empty() {
            return;
        }
        self.items.lock().extend(batch);
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取出全部结果，顺序不保证
    pub fn into_vec(self) -> Vec<FileMatch> {
        self.items.into_inner()
    }
}

/// 被吞掉的目录访问失败
#[derive(Debug, Default)]
pub struct FailureLog {
    entries: Mutex<Vec<AccessFailure>>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, failure: AccessFailure) {
        match failure.kind {
            FailureKind::PermissionDenied => {
                debug!("无权访问 {}", failure.path.display());
            }
            FailureKind::Io => {
                debug!("访问出错 {}: {}", failure.path.display(), failure.message);
            }
        }
        self.entries.lock().push(failure);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<AccessFailure> {
        self.entries.into_inner()
    }
}
