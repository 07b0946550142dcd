use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::AccessFailure;

/// 目录下的一个非目录条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
}

/// 单层目录列举结果
#[derive(Debug, Default)]
pub struct DirListing {
    pub files: Vec<FileEntry>,
    pub subdirs: Vec<PathBuf>,
    /// 目录能打开，但个别条目读取失败
    pub entry_errors: Vec<AccessFailure>,
}

impl DirListing {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.subdirs.is_empty()
    }
}

/// 列举 `dir` 的直接子项；目录本身打不开时返回带分类的失败
///
/// 符号链接不跟随：指向目录的链接仅在 `follow_links` 时作为子目录返回，
/// 其余链接（包括断链）按文件处理。
pub fn list_directory(dir: &Path, follow_links: bool) -> Result<DirListing, AccessFailure> {
    let read_dir = fs::read_dir(dir).map_err(|e| AccessFailure::from_io(dir.to_path_buf(), &e))?;
    Ok(collect_entries(dir, read_dir, follow_links))
}

/// 列举过程中用到的目录项能力
trait DirItem {
    fn path(&self) -> PathBuf;
    fn file_name(&self) -> OsString;
    fn file_type(&self) -> io::Result<fs::FileType>;
}

impl DirItem for fs::DirEntry {
    fn path(&self) -> PathBuf {
        fs::DirEntry::path(self)
    }

    fn file_name(&self) -> OsString {
        fs::DirEntry::file_name(self)
    }

    fn file_type(&self) -> io::Result<fs::FileType> {
        fs::DirEntry::file_type(self)
    }
}

/// 把目录项流分拣为文件、子目录和条目级失败
fn collect_entries<I, E>(dir: &Path, entries: I, follow_links: bool) -> DirListing
where
    I: IntoIterator<Item = io::Result<E>>,
    E: DirItem,
{
    let mut listing = DirListing::default();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                listing.entry_errors.push(AccessFailure::from_io(dir.to_path_buf(), &e));
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                listing.entry_errors.push(AccessFailure::from_io(path, &e));
                continue;
            }
        };

        if file_type.is_dir() {
            listing.subdirs.push(path);
        } else if file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_dir()) {
            if follow_links {
                listing.subdirs.push(path);
            }
        } else {
            listing.files.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
    }
    listing
}
