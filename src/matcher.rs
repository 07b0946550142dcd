use crate::config::CaseSensitivity;

/// 文件名子串匹配，等价于单层目录内的 `*fragment*` 通配
#[derive(Debug, Clone)]
pub struct FragmentMatcher {
    needle: String,
    case_sensitive: bool,
}

impl FragmentMatcher {
    pub fn new(fragment: &str, case: CaseSensitivity) -> Self {
        let case_sensitive = case.is_sensitive();
        // 不区分大小写时预先转小写，避免每个文件重复转换关键词
        let needle = if case_sensitive {
            fragment.to_string()
        } else {
            fragment.to_lowercase()
        };
        Self {
            needle,
            case_sensitive,
        }
    }

    pub fn is_match(&self, name: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        if self.case_sensitive {
            name.contains(&self.needle)
        } else {
            name.to_lowercase().contains(&self.needle)
        }
    }
}
