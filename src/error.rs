use std::io;
use std::path::PathBuf;

use serde::Serialize;

/// 导致整次搜索无法进行的硬错误
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("无法枚举卷: {0}")]
    VolumeEnumeration(String),

    #[error("搜索关键词为空")]
    EmptyFragment,

    #[error("搜索已取消")]
    Cancelled,

    #[error("线程池创建失败: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("后台任务失败: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    PermissionDenied,
    Io,
}

/// 单个目录的访问失败，只记录不传播
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl AccessFailure {
    pub fn from_io(path: PathBuf, err: &io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
            _ => FailureKind::Io,
        };
        Self {
            path,
            kind,
            message: err.to_string(),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.kind == FailureKind::PermissionDenied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_are_tagged() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        let failure = AccessFailure::from_io(PathBuf::from("/root/secret"), &err);
        assert!(failure.is_permission_denied());

        let err = io::Error::from(io::ErrorKind::NotFound);
        let failure = AccessFailure::from_io(PathBuf::from("/gone"), &err);
        assert_eq!(failure.kind, FailureKind::Io);
    }
}
