use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 默认并发遍历线程数：主机并行度，至少 2
pub static DEFAULT_WORKERS: once_cell::sync::Lazy<usize> = once_cell::sync::Lazy::new(|| {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .max(2)
});

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
    /// Windows / macOS 不区分大小写，其余平台区分
    #[default]
    Platform,
}

impl CaseSensitivity {
    pub fn is_sensitive(self) -> bool {
        match self {
            CaseSensitivity::Sensitive => true,
            CaseSensitivity::Insensitive => false,
            CaseSensitivity::Platform => !cfg!(any(windows, target_os = "macos")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyFragmentPolicy {
    /// 空关键词直接报错，不做遍历
    #[default]
    Reject,
    /// 空关键词匹配所有文件
    MatchAll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_workers: usize,
    pub case: CaseSensitivity,
    pub empty_fragment: EmptyFragmentPolicy,
    pub follow_links: bool,
    /// 不进入的目录名，默认为空（如 `$RECYCLE.BIN`）
    pub skip_dir_names: Vec<String>,
    /// 非空时只搜索这些根目录，而不是全部卷
    pub roots: Vec<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_workers: *DEFAULT_WORKERS,
            case: CaseSensitivity::default(),
            empty_fragment: EmptyFragmentPolicy::default(),
            follow_links: false,
            skip_dir_names: Vec::new(),
            roots: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// 读取指定配置文件
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&raw)?;
        Ok(config.normalized())
    }

    /// 读取用户配置目录下的配置；不存在时使用默认值
    pub fn load() -> anyhow::Result<Self> {
        match config_path() {
            Some(p) if p.exists() => Self::load_from(&p),
            _ => Ok(Self::default()),
        }
    }

    fn normalized(mut self) -> Self {
        if self.max_workers == 0 {
            self.max_workers = *DEFAULT_WORKERS;
        }
        self
    }

    pub fn should_skip_dir(&self, name: &str) -> bool {
        self.skip_dir_names.iter().any(|s| s == name)
    }
}

/// 配置保存目录
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("volsearch"))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE_NAME))
}
