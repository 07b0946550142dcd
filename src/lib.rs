//! 全盘文件名搜索引擎。
//!
//! 枚举本机所有就绪的卷，对每个卷并发递归遍历目录树，按文件名子串匹配，
//! 把命中汇总到一个多写者安全的结果集合。单个目录的权限或 I/O 错误只记录，
//! 不会中断其他分支；只有无法开始遍历（枚举卷失败）才让整次搜索失败。

pub mod actions;
pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod listing;
pub mod matcher;
pub mod sink;
pub mod types;
pub mod volume;
pub mod walker;

pub use cancel::CancellationToken;
pub use config::{CaseSensitivity, EmptyFragmentPolicy, SearchConfig};
pub use coordinator::Searcher;
pub use error::{AccessFailure, FailureKind, Result, SearchError};
pub use types::{FileMatch, SearchReport, SearchRequest, SearchStats, Volume};
pub use volume::{FixedVolumes, SystemVolumes, VolumeSource};
