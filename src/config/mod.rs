use std::env;
use std::path::PathBuf;

/// 运行配置，优先级：命令行参数 > 环境变量 > .env 文件 > 默认值
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM API key，必填
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    /// 同时在途的分类请求上限
    pub concurrency_limit: usize,
    /// 送入 prompt 的评论文本（标题+正文）最大字符数，硬截断
    pub max_prompt_chars: usize,
    /// 单次 LLM 请求超时（秒），超时按调用失败处理
    pub request_timeout_secs: u64,

    /// 待抓取的运营商 slug 列表
    pub target_operators: Vec<String>,
    /// 只保留最近 N 天的评论
    pub days_to_scrape: i64,
    pub hellopeter_base_url: String,

    pub smtp_server: String,
    pub smtp_port: u16,
    pub email_sender: Option<String>,
    pub email_password: Option<String>,
    pub email_receivers: Vec<String>,

    /// 中间快照路径，便于排查与复跑
    pub raw_snapshot: String,
    pub analyzed_snapshot: String,

    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config {
            llm_api_key: None,
            llm_base_url: "https://api.deepseek.com".to_string(),
            llm_model: "deepseek-chat".to_string(),
            concurrency_limit: 10,
            max_prompt_chars: 2000,
            request_timeout_secs: 60,
            target_operators: vec![
                "vodacom".to_string(),
                "mtn".to_string(),
                "telkom".to_string(),
                "rain-internet-service-provider".to_string(),
            ],
            days_to_scrape: 7,
            hellopeter_base_url: "https://api.hellopeter.com".to_string(),
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            email_sender: None,
            email_password: None,
            email_receivers: Vec::new(),
            raw_snapshot: "raw_reviews.json".to_string(),
            analyzed_snapshot: "analyzed_reviews.json".to_string(),
            debug: false,
        };

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.review-radar/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(api_key) = env::var("REVIEW_RADAR_LLM_API_KEY") {
            self.llm_api_key = Some(api_key);
        }
        if let Ok(url) = env::var("REVIEW_RADAR_LLM_BASE_URL") {
            self.llm_base_url = url;
        }
        if let Ok(model) = env::var("REVIEW_RADAR_LLM_MODEL") {
            self.llm_model = model;
        }
        if let Ok(value) = env::var("REVIEW_RADAR_CONCURRENCY") {
            if let Ok(limit) = value.parse::<usize>() {
                self.concurrency_limit = limit;
            }
        }
        if let Ok(value) = env::var("REVIEW_RADAR_MAX_PROMPT_CHARS") {
            if let Ok(max) = value.parse::<usize>() {
                self.max_prompt_chars = max;
            }
        }
        if let Ok(value) = env::var("REVIEW_RADAR_OPERATORS") {
            let operators: Vec<String> = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !operators.is_empty() {
                self.target_operators = operators;
            }
        }
        if let Ok(value) = env::var("REVIEW_RADAR_DAYS") {
            if let Ok(days) = value.parse::<i64>() {
                self.days_to_scrape = days;
            }
        }
        if let Ok(url) = env::var("REVIEW_RADAR_HELLOPETER_URL") {
            self.hellopeter_base_url = url;
        }
        if let Ok(server) = env::var("REVIEW_RADAR_SMTP_SERVER") {
            self.smtp_server = server;
        }
        if let Ok(value) = env::var("REVIEW_RADAR_SMTP_PORT") {
            if let Ok(port) = value.parse::<u16>() {
                self.smtp_port = port;
            }
        }
        if let Ok(sender) = env::var("REVIEW_RADAR_EMAIL_SENDER") {
            self.email_sender = Some(sender);
        }
        if let Ok(password) = env::var("REVIEW_RADAR_EMAIL_PASSWORD") {
            self.email_password = Some(password);
        }
        if let Ok(value) = env::var("REVIEW_RADAR_EMAIL_RECEIVERS") {
            self.email_receivers = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if let Some(operators) = &args.operators {
            self.target_operators = operators
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(days) = args.days {
            self.days_to_scrape = days;
        }
        if let Some(concurrency) = args.concurrency {
            self.concurrency_limit = concurrency;
        }
        if let Some(max) = args.max_prompt_chars {
            self.max_prompt_chars = max;
        }
        if args.debug {
            self.debug = true;
        }
    }

    /// 分类批次启动前的配置校验，失败则整个批次不开始
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm_api_key.as_deref().unwrap_or("").is_empty() {
            anyhow::bail!("LLM API key is required but not set. Please set REVIEW_RADAR_LLM_API_KEY environment variable or in .env file");
        }
        if self.llm_base_url.is_empty() {
            anyhow::bail!("LLM base URL must not be empty");
        }
        if self.concurrency_limit == 0 {
            anyhow::bail!("Concurrency limit must be greater than 0");
        }
        if self.max_prompt_chars == 0 {
            anyhow::bail!("Max prompt chars must be greater than 0");
        }
        if self.target_operators.is_empty() {
            anyhow::bail!("At least one target operator is required");
        }
        Ok(())
    }

    /// 邮件投递配置校验，dry-run 模式下跳过
    pub fn validate_mail(&self) -> anyhow::Result<()> {
        if self.email_sender.as_deref().unwrap_or("").is_empty() {
            anyhow::bail!("Email sender is required but not set. Please set REVIEW_RADAR_EMAIL_SENDER environment variable or in .env file");
        }
        if self.email_password.as_deref().unwrap_or("").is_empty() {
            anyhow::bail!("Email password is required but not set. Please set REVIEW_RADAR_EMAIL_PASSWORD environment variable or in .env file");
        }
        if self.email_receivers.is_empty() {
            anyhow::bail!("At least one email receiver is required. Please set REVIEW_RADAR_EMAIL_RECEIVERS (comma separated)");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
