//! 搜索结果上的界面操作：打开、在文件管理器中显示、复制完整路径。
//!
//! 这些操作只读取 `FileMatch::full_path`；文件在搜索后被删除等情况由调用方处理。

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::types::FileMatch;

/// 用系统默认程序打开
pub fn open_match(item: &FileMatch) -> Result<()> {
    info!("打开 {}", item.full_path.display());
    open::that(&item.full_path).with_context(|| format!("无法打开 {}", item.full_path.display()))
}

/// 在文件管理器中定位
pub fn reveal_in_file_manager(item: &FileMatch) -> Result<()> {
    info!("定位 {}", item.full_path.display());
    reveal(&item.full_path)
}

#[cfg(windows)]
fn reveal(path: &Path) -> Result<()> {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x08000000;

    std::process::Command::new("explorer.exe")
        .raw_arg(format!("/select,\"{}\"", path.display()))
        .creation_flags(CREATE_NO_WINDOW)
        .spawn()
        .context("启动资源管理器失败")?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn reveal(path: &Path) -> Result<()> {
    std::process::Command::new("open")
        .arg("-R")
        .arg(path)
        .spawn()
        .context("启动 Finder 失败")?;
    Ok(())
}

#[cfg(not(any(windows, target_os = "macos")))]
fn reveal(path: &Path) -> Result<()> {
    // 没有通用的“选中文件”接口，退而打开所在目录
    let parent = path.parent().unwrap_or(path);
    open::that(parent).with_context(|| format!("无法打开目录 {}", parent.display()))
}

/// 复制完整路径到剪贴板
pub fn copy_path_to_clipboard(item: &FileMatch) -> Result<()> {
    let text = item.full_path.to_string_lossy().into_owned();
    let mut clipboard = arboard::Clipboard::new().context("无法访问剪贴板")?;
    clipboard.set_text(text).context("写入剪贴板失败")?;
    Ok(())
}
