//! 递归目录遍历。
//!
//! 每个目录：列举一层，匹配文件名写入结果集，然后对所有子目录并行递归。
//! 子目录的递归在 rayon 线程池上展开，同时在途的工作数受池大小限制；
//! `for_each` 是汇合点，父目录在全部子树结束后才返回。
//!
//! 单个目录打不开只记入失败日志，不影响兄弟和祖先目录。

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::config::SearchConfig;
use crate::listing::list_directory;
use crate::matcher::FragmentMatcher;
use crate::sink::{FailureLog, ResultSet};
use crate::types::FileMatch;

/// 一次搜索中所有遍历分支共享的上下文
#[derive(Debug)]
pub struct Walker<'a> {
    matcher: &'a FragmentMatcher,
    config: &'a SearchConfig,
    results: &'a ResultSet,
    failures: &'a FailureLog,
    cancel: &'a CancellationToken,
    /// 跟随符号链接时记录已进入的目录（规范化路径），防止环路与重复
    visited: Option<Mutex<HashSet<PathBuf>>>,
    dirs_visited: AtomicUsize,
    files_examined: AtomicUsize,
    /// 正在列举目录的分支数，以及它的峰值
    active_listings: AtomicUsize,
    peak_listings: AtomicUsize,
}

impl<'a> Walker<'a> {
    pub fn new(
        matcher: &'a FragmentMatcher,
        config: &'a SearchConfig,
        results: &'a ResultSet,
        failures: &'a FailureLog,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            matcher,
            config,
            results,
            failures,
            cancel,
            visited: config.follow_links.then(|| Mutex::new(HashSet::new())),
            dirs_visited: AtomicUsize::new(0),
            files_examined: AtomicUsize::new(0),
            active_listings: AtomicUsize::new(0),
            peak_listings: AtomicUsize::new(0),
        }
    }

    pub fn dirs_visited(&self) -> usize {
        self.dirs_visited.load(Ordering::Relaxed)
    }

    pub fn files_examined(&self) -> usize {
        self.files_examined.load(Ordering::Relaxed)
    }

    /// 同时处于列举/匹配阶段的分支数峰值，不超过线程池大小
    pub fn peak_listings(&self) -> usize {
        self.peak_listings.load(Ordering::Relaxed)
    }

    /// 遍历 `dir` 整棵子树；返回时所有子目录均已处理完
    pub fn walk(&self, dir: &Path) {
        if self.cancel.is_cancelled() {
            return;
        }
        if !self.first_visit(dir) {
            return;
        }

        let active = self.active_listings.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_listings.fetch_max(active, Ordering::SeqCst);
        let subdirs = self.scan_one(dir);
        self.active_listings.fetch_sub(1, Ordering::SeqCst);

        // 子目录并行递归，等待全部完成后返回
        subdirs
            .par_iter()
            .filter(|sub| !self.is_skipped(sub))
            .for_each(|sub| self.walk(sub));
    }

    /// 列举并匹配一层目录，返回待递归的子目录
    fn scan_one(&self, dir: &Path) -> Vec<PathBuf> {
        let listing = match list_directory(dir, self.config.follow_links) {
            Ok(l) => l,
            Err(failure) => {
                self.failures.record(failure);
                return Vec::new();
            }
        };
        self.dirs_visited.fetch_add(1, Ordering::Relaxed);
        for failure in listing.entry_errors {
            self.failures.record(failure);
        }

        let mut batch = Vec::new();
        for file in listing.files {
            if self.cancel.is_cancelled() {
                return Vec::new();
            }
            self.files_examined.fetch_add(1, Ordering::Relaxed);
            if self.matcher.is_match(&file.name) {
                let modified = fs::metadata(&file.path).and_then(|m| m.modified()).ok();
                batch.push(FileMatch::new(file.name, file.path, modified));
            }
        }
        self.results.extend(batch);
        listing.subdirs
    }

    fn is_skipped(&self, dir: &Path) -> bool {
        let skipped = dir
            .file_name()
            .map(|n| self.config.should_skip_dir(&n.to_string_lossy()))
            .unwrap_or(false);
        if skipped {
            debug!("按配置跳过目录 {}", dir.display());
        }
        skipped
    }

    fn first_visit(&self, dir: &Path) -> bool {
        match &self.visited {
            Some(visited) => {
                let key = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
                visited.lock().insert(key)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaseSensitivity;
    use crate::error::FailureKind;
    use std::fs::File;
    use tempfile::TempDir;

    struct Fixture {
        matcher: FragmentMatcher,
        config: SearchConfig,
        results: ResultSet,
        failures: FailureLog,
        cancel: CancellationToken,
    }

    impl Fixture {
        fn new(fragment: &str) -> Self {
            Self {
                matcher: FragmentMatcher::new(fragment, CaseSensitivity::Sensitive),
                config: SearchConfig::default(),
                results: ResultSet::new(),
                failures: FailureLog::new(),
                cancel: CancellationToken::new(),
            }
        }

        fn walker(&self) -> Walker<'_> {
            Walker::new(
                &self.matcher,
                &self.config,
                &self.results,
                &self.failures,
                &self.cancel,
            )
        }

        fn names(self) -> Vec<String> {
            let mut names: Vec<_> = self.results.into_vec().into_iter().map(|m| m.name).collect();
            names.sort_unstable();
            names
        }
    }

    #[test]
    fn matches_at_every_depth() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b/c")).unwrap();
        File::create(temp.path().join("top_note.txt")).unwrap();
        File::create(temp.path().join("a/note.md")).unwrap();
        File::create(temp.path().join("a/b/c/old_note")).unwrap();
        File::create(temp.path().join("a/b/other.txt")).unwrap();

        let fx = Fixture::new("note");
        let walker = fx.walker();
        walker.walk(temp.path());
        assert_eq!(walker.dirs_visited(), 4);
        assert_eq!(walker.files_examined(), 4);
        drop(walker);

        assert_eq!(fx.names(), vec!["note.md", "old_note", "top_note.txt"]);
    }

    #[test]
    fn directories_themselves_are_not_matches() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("notes")).unwrap();
        File::create(temp.path().join("notes/readme")).unwrap();

        let fx = Fixture::new("note");
        fx.walker().walk(temp.path());
        assert!(fx.names().is_empty());
    }

    #[test]
    fn empty_directory_terminates_cleanly() {
        let temp = TempDir::new().unwrap();
        let fx = Fixture::new("x");
        let walker = fx.walker();
        walker.walk(temp.path());
        assert_eq!(walker.dirs_visited(), 1);
        assert_eq!(walker.files_examined(), 0);
        assert!(fx.results.is_empty());
        assert!(fx.failures.is_empty());
    }

    #[test]
    fn unreadable_root_is_recorded_not_raised() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("gone");

        let fx = Fixture::new("x");
        fx.walker().walk(&gone);
        assert!(fx.results.is_empty());
        let failures = fx.failures.into_vec();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::Io);
        assert_eq!(failures[0].path, gone);
    }

    #[test]
    fn skipped_directory_names_are_not_entered() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("$RECYCLE.BIN")).unwrap();
        File::create(temp.path().join("$RECYCLE.BIN/deleted.txt")).unwrap();
        File::create(temp.path().join("kept.txt")).unwrap();

        let mut fx = Fixture::new(".txt");
        fx.config.skip_dir_names = vec!["$RECYCLE.BIN".to_string()];
        fx.walker().walk(temp.path());
        assert_eq!(fx.names(), vec!["kept.txt"]);
    }

    #[test]
    fn system_directories_are_entered_by_default() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("System Volume Information")).unwrap();
        File::create(temp.path().join("System Volume Information/my_report.txt")).unwrap();

        let fx = Fixture::new("my_report");
        fx.walker().walk(temp.path());
        assert_eq!(fx.names(), vec!["my_report.txt"]);
    }

    #[test]
    fn unopenable_directory_is_not_counted_as_visited() {
        let temp = TempDir::new().unwrap();
        let fx = Fixture::new("x");
        let walker = fx.walker();
        walker.walk(&temp.path().join("gone"));
        assert_eq!(walker.dirs_visited(), 0);
        assert_eq!(walker.peak_listings(), 1);
        assert_eq!(fx.failures.len(), 1);
    }

    #[test]
    fn far_future_mtime_does_not_abort_walk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("far_future.txt");
        let file = File::create(&path).unwrap();
        let far = std::time::UNIX_EPOCH
            .checked_add(std::time::Duration::from_secs(10u64.pow(15)))
            .unwrap_or(std::time::UNIX_EPOCH);
        // 部分文件系统会拒绝或截断该时间戳，无论哪种都不能让遍历崩溃
        let _ = file.set_modified(far);
        drop(file);
        File::create(temp.path().join("far_sibling.txt")).unwrap();

        let fx = Fixture::new("far_");
        fx.walker().walk(temp.path());
        assert_eq!(fx.names(), vec!["far_future.txt", "far_sibling.txt"]);
    }

    #[test]
    fn cancelled_walk_stops_immediately() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("file.txt")).unwrap();

        let fx = Fixture::new("file");
        fx.cancel.cancel();
        let walker = fx.walker();
        walker.walk(temp.path());
        assert_eq!(walker.dirs_visited(), 0);
        assert!(fx.results.is_empty());
    }

    #[test]
    fn matches_carry_modified_time() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("stamp.log")).unwrap();

        let fx = Fixture::new("stamp");
        fx.walker().walk(temp.path());
        let matches = fx.results.into_vec();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].modified.is_some());
        assert_eq!(matches[0].full_path, temp.path().join("stamp.log"));
    }

    #[cfg(unix)]
    #[test]
    fn followed_symlink_cycle_terminates_without_duplicates() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("loop")).unwrap();
        File::create(temp.path().join("loop/cycle_hit.txt")).unwrap();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("loop/back")).unwrap();

        let mut fx = Fixture::new("cycle_hit");
        fx.config.follow_links = true;
        fx.walker().walk(temp.path());
        assert_eq!(fx.names(), vec!["cycle_hit.txt"]);
    }
}
