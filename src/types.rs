use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AccessFailure;

/// 搜索命中的单个文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatch {
    pub name: String,
    pub full_path: PathBuf,
    pub modified: Option<DateTime<Local>>,
    pub icon_hint: String,
}

impl FileMatch {
    pub fn new(name: String, full_path: PathBuf, modified: Option<SystemTime>) -> Self {
        let icon_hint = icon_for(&full_path).to_string();
        Self {
            name,
            full_path,
            modified: modified.and_then(local_time),
            icon_hint,
        }
    }

    /// 修改时间的展示字符串，未知时返回 "-"
    pub fn modified_display(&self) -> String {
        match &self.modified {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "-".to_string(),
        }
    }

    pub fn extension(&self) -> Option<&str> {
        self.full_path.extension()?.to_str()
    }
}

/// 转换为本地时间；超出 chrono 表示范围的时间戳返回 None
fn local_time(t: SystemTime) -> Option<DateTime<Local>> {
    let (secs, nanos) = match t.duration_since(UNIX_EPOCH) {
        Ok(d) => (i64::try_from(d.as_secs()).ok()?, d.subsec_nanos()),
        Err(e) => {
            // 1970 年以前
            let d = e.duration();
            let secs = -i64::try_from(d.as_secs()).ok()?;
            match d.subsec_nanos() {
                0 => (secs, 0),
                n => (secs.checked_sub(1)?, 1_000_000_000 - n),
            }
        }
    };
    DateTime::<Utc>::from_timestamp(secs, nanos).map(|utc| utc.with_timezone(&Local))
}

/// 按扩展名给出展示用图标，不参与任何匹配逻辑
pub fn icon_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => match ext.to_lowercase().as_str() {
            "rs" => "🦀",
            "py" => "🐍",
            "js" | "ts" | "jsx" | "tsx" => "📜",
            "html" | "css" | "scss" => "🌐",
            "json" | "yaml" | "yml" | "toml" | "xml" => "⚙",
            "md" | "txt" | "doc" | "docx" => "📝",
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" => "🖼",
            "mp3" | "wav" | "flac" | "m4a" => "🎵",
            "mp4" | "avi" | "mkv" | "wmv" => "🎬",
            "zip" | "rar" | "7z" | "tar" | "gz" => "📦",
            "exe" | "msi" | "lnk" => "⚡",
            "pdf" => "📕",
            "ppt" | "pptx" => "📊",
            "xls" | "xlsx" => "📈",
            _ => "📄",
        },
        None => "📄",
    }
}

/// 顶层挂载卷（盘符或根目录），每次搜索重新枚举
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub root: PathBuf,
    pub is_ready: bool,
}

impl Volume {
    /// 探测根目录是否可访问
    pub fn detect(root: PathBuf) -> Self {
        let is_ready = std::fs::metadata(&root)
            .map(|m| m.is_dir())
            .unwrap_or(false);
        Self { root, is_ready }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub fragment: String,
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// 空白输入不触发搜索（界面层约定）
    pub fn is_blank(&self) -> bool {
        self.fragment.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub volumes: usize,
    pub dirs_visited: usize,
    pub files_examined: usize,
    /// 同时在列举目录的工作数峰值
    pub peak_workers: usize,
}

/// 一次搜索的完整结果：命中、被吞掉的访问失败、统计
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub matches: Vec<FileMatch>,
    pub failures: Vec<AccessFailure>,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

impl SearchReport {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
