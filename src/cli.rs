use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::warn;

use volsearch::actions;
use volsearch::{
    CancellationToken, CaseSensitivity, EmptyFragmentPolicy, FileMatch, SearchConfig,
    SearchError, SearchRequest, Searcher,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "全盘文件名搜索", long_about = None)]
pub struct CliArgs {
    /// 文件名关键词（子串匹配）
    pub fragment: String,

    /// 只搜索这些目录（可多次指定，默认=本机全部卷）
    #[arg(short = 's', long = "scope")]
    pub scope: Vec<PathBuf>,

    /// 大小写策略
    #[arg(long = "case", value_enum)]
    pub case: Option<CaseArg>,

    /// 并发遍历线程数
    #[arg(short = 'w', long = "workers")]
    pub workers: Option<usize>,

    /// 跟随指向目录的符号链接
    #[arg(long = "follow-links")]
    pub follow_links: bool,

    /// 空关键词匹配全部文件
    #[arg(long = "allow-empty")]
    pub allow_empty: bool,

    /// 配置文件路径（默认=用户配置目录下的 config.json）
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// 以 JSON 输出
    #[arg(long = "json")]
    pub json: bool,

    /// 最多显示的结果数
    #[arg(short = 'm', long = "limit")]
    pub limit: Option<usize>,

    /// 打开第 N 个结果（从 1 开始）
    #[arg(long = "open", value_name = "N")]
    pub open: Option<usize>,

    /// 在文件管理器中显示第 N 个结果
    #[arg(long = "reveal", value_name = "N")]
    pub reveal: Option<usize>,

    /// 复制第 N 个结果的完整路径
    #[arg(long = "copy", value_name = "N")]
    pub copy: Option<usize>,

    /// 输出调试日志
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CaseArg {
    Sensitive,
    Insensitive,
    Platform,
}

impl From<CaseArg> for CaseSensitivity {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Sensitive => CaseSensitivity::Sensitive,
            CaseArg::Insensitive => CaseSensitivity::Insensitive,
            CaseArg::Platform => CaseSensitivity::Platform,
        }
    }
}

impl CliArgs {
    /// 配置文件打底，命令行参数覆盖
    pub fn to_config(&self) -> anyhow::Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::load_from(path)
                .with_context(|| format!("读取配置失败: {}", path.display()))?,
            None => SearchConfig::load().context("读取用户配置失败")?,
        };
        if !self.scope.is_empty() {
            config.roots = self.scope.clone();
        }
        if let Some(case) = self.case {
            config.case = case.into();
        }
        if let Some(workers) = self.workers.filter(|w| *w > 0) {
            config.max_workers = workers;
        }
        if self.follow_links {
            config.follow_links = true;
        }
        if self.allow_empty {
            config.empty_fragment = EmptyFragmentPolicy::MatchAll;
        }
        Ok(config)
    }
}

// CLI入口
pub async fn run_cli(args: CliArgs) -> anyhow::Result<()> {
    let request = SearchRequest {
        fragment: args.fragment.clone(),
        limit: args.limit,
    };
    // 空白输入不搜索，除非明确允许匹配全部
    if request.is_blank() && !args.allow_empty {
        return Ok(());
    }

    let searcher = Searcher::new(args.to_config()?)?;

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，正在取消搜索...");
            ctrl_c_token.cancel();
        }
    });

    let report = match searcher.search_async(request.fragment.clone(), token).await {
        Ok(report) => report,
        Err(SearchError::Cancelled) => {
            eprintln!("搜索已取消");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut matches = report.matches.clone();
    matches.sort_by(|a, b| a.full_path.cmp(&b.full_path));
    let shown: Vec<FileMatch> = match request.limit {
        Some(limit) => matches.into_iter().take(limit).collect(),
        None => matches,
    };

    if args.json {
        let output = json!({
            "code": 0,
            "msg": "success",
            "fragment": request.fragment,
            "total": report.matches.len(),
            "elapsed_ms": report.elapsed_ms(),
            "stats": &report.stats,
            "failures": report.failures.len(),
            "results": &shown,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (i, item) in shown.iter().enumerate() {
            println!(
                "{:>4}. {} {}  {}",
                i + 1,
                item.icon_hint,
                item.modified_display(),
                item.full_path.display()
            );
        }
        eprintln!(
            "共 {} 个结果，{} 个目录无法访问，耗时 {}ms",
            report.matches.len(),
            report.failures.len(),
            report.elapsed_ms()
        );
    }

    if let Some(n) = args.open {
        actions::open_match(pick(&shown, n)?)?;
    }
    if let Some(n) = args.reveal {
        actions::reveal_in_file_manager(pick(&shown, n)?)?;
    }
    if let Some(n) = args.copy {
        actions::copy_path_to_clipboard(pick(&shown, n)?)?;
    }
    Ok(())
}

fn pick(items: &[FileMatch], n: usize) -> anyhow::Result<&FileMatch> {
    n.checked_sub(1)
        .and_then(|i| items.get(i))
        .with_context(|| format!("没有第 {} 个结果（共 {} 个）", n, items.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = CliArgs::parse_from([
            "volsearch",
            "report",
            "--scope",
            "/data",
            "--case",
            "insensitive",
            "--workers",
            "3",
            "--allow-empty",
            "--config",
            "/definitely/missing.json",
        ]);
        assert_eq!(args.fragment, "report");
        assert!(args.to_config().is_err());

        let args = CliArgs::parse_from(["volsearch", "x", "-s", "/a", "-s", "/b", "-w", "0"]);
        assert_eq!(args.scope.len(), 2);
        assert_eq!(args.workers, Some(0));
    }

    #[test]
    fn pick_is_one_based() {
        let items = vec![
            FileMatch::new("a".into(), PathBuf::from("/a"), None),
            FileMatch::new("b".into(), PathBuf::from("/b"), None),
        ];
        assert_eq!(pick(&items, 2).unwrap().name, "b");
        assert!(pick(&items, 0).is_err());
        assert!(pick(&items, 3).is_err());
    }

    #[test]
    fn explicit_config_file_is_layered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "follow_links": true, "max_workers": 8 }"#).unwrap();

        let config_arg = path.to_string_lossy().into_owned();
        let args = CliArgs::parse_from([
            "volsearch", "x", "--config", config_arg.as_str(), "--workers", "2", "--case", "sensitive",
        ]);
        let config = args.to_config().unwrap();
        assert!(config.follow_links);
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.case, CaseSensitivity::Sensitive);
        assert_eq!(config.empty_fragment, EmptyFragmentPolicy::Reject);
    }
}
