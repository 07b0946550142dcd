//! 搜索取消令牌。
//!
//! 协调器与遍历器共享同一个令牌；遍历器在打开每个目录前以及逐条处理
//! 目录项时检查它，一旦取消便停止向下展开。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 可克隆的取消令牌，所有克隆共享同一个标志位
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消，所有持有克隆的任务都会看到
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
