use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::types::Volume;

/// 卷来源：协调器每次搜索前调用一次
pub trait VolumeSource: Send + Sync {
    fn volumes(&self) -> Result<Vec<Volume>>;

    /// 只保留当前可访问的卷
    fn ready_volumes(&self) -> Result<Vec<Volume>> {
        let (ready, not_ready): (Vec<_>, Vec<_>) =
            self.volumes()?.into_iter().partition(|v| v.is_ready);
        for v in &not_ready {
            warn!("卷未就绪，跳过: {}", v.root.display());
        }
        Ok(ready)
    }
}

/// 本机所有卷
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVolumes;

impl VolumeSource for SystemVolumes {
    fn volumes(&self) -> Result<Vec<Volume>> {
        let roots = logical_drive_roots()?;
        debug!("发现卷: {:?}", roots);
        Ok(roots.into_iter().map(Volume::detect).collect())
    }
}

#[cfg(windows)]
fn logical_drive_roots() -> Result<Vec<PathBuf>> {
    use windows::Win32::Storage::FileSystem::GetLogicalDrives;

    let mask = unsafe { GetLogicalDrives() };
    if mask == 0 {
        return Err(crate::error::SearchError::VolumeEnumeration(
            std::io::Error::last_os_error().to_string(),
        ));
    }
    let mut roots = Vec::new();
    for i in 0..26 {
        if (mask & (1 << i)) != 0 {
            let drive = (b'A' + i as u8) as char;
            roots.push(PathBuf::from(format!("{}:\\", drive)));
        }
    }
    Ok(roots)
}

#[cfg(not(windows))]
fn logical_drive_roots() -> Result<Vec<PathBuf>> {
    Ok(vec![PathBuf::from("/")])
}

/// 调用方指定的根目录（U盘、外挂盘、测试目录）
#[derive(Debug, Clone)]
pub struct FixedVolumes {
    roots: Vec<PathBuf>,
}

impl FixedVolumes {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }
}

impl VolumeSource for FixedVolumes {
    fn volumes(&self) -> Result<Vec<Volume>> {
        // 规范化路径只用于比较包含关系，返回给调用方的仍是原写法
        let roots = self
            .roots
            .iter()
            .map(|r| {
                let given = absolute(r);
                let key = std::fs::canonicalize(&given).unwrap_or_else(|_| given.clone());
                (key, given)
            })
            .collect();
        Ok(collapse_nested(roots).into_iter().map(Volume::detect).collect())
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// 按比较键去掉重复根目录以及被其他根目录包含的子目录，保证同一文件只被遍历一次
fn collapse_nested<T>(mut roots: Vec<(PathBuf, T)>) -> Vec<T> {
    roots.sort_by(|a, b| a.0.cmp(&b.0));
    roots.dedup_by(|a, b| a.0 == b.0);
    let mut kept: Vec<(PathBuf, T)> = Vec::with_capacity(roots.len());
    for root in roots {
        if !kept.iter().any(|(k, _)| root.0.starts_with(k)) {
            kept.push(root);
        }
    }
    kept.into_iter().map(|(_, given)| given).collect()
}
