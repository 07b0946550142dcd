use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::info;

use crate::cancel::CancellationToken;
use crate::config::{EmptyFragmentPolicy, SearchConfig};
use crate::error::{Result, SearchError};
use crate::matcher::FragmentMatcher;
use crate::sink::{FailureLog, ResultSet};
use crate::types::{FileMatch, SearchReport, SearchStats};
use crate::volume::{FixedVolumes, SystemVolumes, VolumeSource};
use crate::walker::Walker;

/// 搜索协调器：枚举卷、每卷一个遍历并发执行、汇总结果
///
/// 克隆开销很小，线程池与卷来源共享。
#[derive(Clone)]
pub struct Searcher {
    config: Arc<SearchConfig>,
    volumes: Arc<dyn VolumeSource>,
    pool: Arc<ThreadPool>,
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("config", &self.config)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl Searcher {
    /// 配置了 `roots` 时只搜这些目录，否则搜本机全部卷
    pub fn new(config: SearchConfig) -> Result<Self> {
        let volumes: Arc<dyn VolumeSource> = if config.roots.is_empty() {
            Arc::new(SystemVolumes)
        } else {
            Arc::new(FixedVolumes::new(config.roots.clone()))
        };
        Self::with_volumes(config, volumes)
    }

    pub fn with_volumes(config: SearchConfig, volumes: Arc<dyn VolumeSource>) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_workers.max(1))
            .thread_name(|i| format!("volsearch-walk-{i}"))
            // 递归深度随目录层级增长
            .stack_size(8 * 1024 * 1024)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            volumes,
            pool: Arc::new(pool),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// 阻塞搜索，返回全部命中（顺序不保证）
    pub fn search(&self, fragment: &str) -> Result<Vec<FileMatch>> {
        self.search_with_cancel(fragment, &CancellationToken::new())
            .map(|report| report.matches)
    }

    /// 阻塞搜索，附带失败日志与统计；令牌被触发时返回 `Cancelled`
    pub fn search_with_cancel(
        &self,
        fragment: &str,
        cancel: &CancellationToken,
    ) -> Result<SearchReport> {
        if fragment.is_empty() && self.config.empty_fragment == EmptyFragmentPolicy::Reject {
            return Err(SearchError::EmptyFragment);
        }

        let started = Instant::now();
        let volumes = self.volumes.ready_volumes()?;
        info!("开始搜索 '{}'，共 {} 个卷", fragment, volumes.len());

        let matcher = FragmentMatcher::new(fragment, self.config.case);
        let results = ResultSet::new();
        let failures = FailureLog::new();
        let walker = Walker::new(&matcher, &self.config, &results, &failures, cancel);

        self.pool.install(|| {
            volumes.par_iter().for_each(|volume| walker.walk(&volume.root));
        });

        let stats = SearchStats {
            volumes: volumes.len(),
            dirs_visited: walker.dirs_visited(),
            files_examined: walker.files_examined(),
            peak_workers: walker.peak_listings(),
        };
        drop(walker);

        if cancel.is_cancelled() {
            info!("搜索 '{}' 已取消", fragment);
            return Err(SearchError::Cancelled);
        }

        let report = SearchReport {
            matches: results.into_vec(),
            failures: failures.into_vec(),
            stats,
            elapsed: started.elapsed(),
        };
        info!(
            "搜索 '{}' 完成: {} 个结果, {} 个目录无法访问, 耗时 {}ms",
            fragment,
            report.matches.len(),
            report.failures.len(),
            report.elapsed_ms()
        );
        Ok(report)
    }

    /// 在阻塞线程上执行搜索，供异步调用方等待
    pub async fn search_async(
        &self,
        fragment: String,
        cancel: CancellationToken,
    ) -> Result<SearchReport> {
        let searcher = self.clone();
        tokio::task::spawn_blocking(move || searcher.search_with_cancel(&fragment, &cancel))
            .await
            .map_err(|e| SearchError::Task(e.to_string()))?
    }
}
