use clap::Parser;

/// 评论雷达：抓取电信运营商评论，LLM 分类后生成 HTML 周报并邮件推送
#[derive(Parser, Debug, Clone)]
#[command(name = "review-radar", version, about)]
pub struct Args {
    /// 逗号分隔的运营商 slug 列表，覆盖配置
    #[arg(long)]
    pub operators: Option<String>,

    /// 只抓取最近 N 天的评论
    #[arg(long)]
    pub days: Option<i64>,

    /// 同时在途的分类请求上限
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// 送入 prompt 的评论文本最大字符数
    #[arg(long)]
    pub max_prompt_chars: Option<usize>,

    /// 只生成报告不发邮件
    #[arg(long)]
    pub dry_run: bool,

    /// 把报告 HTML 另存到指定路径
    #[arg(long)]
    pub output: Option<String>,

    /// 输出调试日志
    #[arg(long)]
    pub debug: bool,
}
