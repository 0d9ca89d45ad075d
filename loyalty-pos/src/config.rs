use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use loyalty_client::ClientConfig;
use loyalty_session::SessionConfig;

/// 收银终端配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | LOYALTY_API_URL | http://localhost:8080 | 会员积分后端地址 |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP 请求超时(毫秒) |
/// | LOOKUP_TIMEOUT_MS | 10000 | 每个查询步骤的超时(毫秒) |
/// | WORK_DIR | ./.loyalty-pos | 工作目录，存放凭证和日志 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | (无) | 日志文件目录，按天滚动 |
///
/// Command-line flags override the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_ms: u64,
    pub lookup_timeout_ms: u64,
    pub work_dir: PathBuf,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,
}

/// Loyalty scan POS console
#[derive(Debug, Default, Parser)]
#[command(name = "loyalty-pos", version, about)]
pub struct Args {
    /// Loyalty backend base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// HTTP request timeout in milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Timeout of each lookup step in milliseconds
    #[arg(long)]
    pub lookup_timeout_ms: Option<u64>,

    /// Directory holding the cashier credential
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Log level or filter directive (e.g. "debug", "loyalty_session=trace")
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    pub log_json: bool,

    /// Write logs to a daily rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: var("LOYALTY_API_URL").unwrap_or_else(|| "http://localhost:8080".into()),
            request_timeout_ms: var("REQUEST_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
            lookup_timeout_ms: var("LOOKUP_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            work_dir: var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".loyalty-pos")),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: var("LOG_JSON")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: var("LOG_DIR").filter(|v| !v.is_empty()).map(PathBuf::from),
        }
    }

    /// 命令行参数覆盖环境变量
    pub fn with_args(mut self, args: Args) -> Self {
        if let Some(url) = args.api_url {
            self.api_url = url;
        }
        if let Some(ms) = args.request_timeout_ms {
            self.request_timeout_ms = ms;
        }
        if let Some(ms) = args.lookup_timeout_ms {
            self.lookup_timeout_ms = ms;
        }
        if let Some(dir) = args.work_dir {
            self.work_dir = dir;
        }
        if let Some(level) = args.log_level {
            self.log_level = level;
        }
        if args.log_json {
            self.log_json = true;
        }
        if let Some(dir) = args.log_dir {
            self.log_dir = Some(dir);
        }
        self
    }

    pub fn credential_path(&self) -> PathBuf {
        self.work_dir.join("credential.json")
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone())
            .with_timeout_ms(self.request_timeout_ms)
            .with_credential_path(self.credential_path())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default().with_lookup_timeout(Duration::from_millis(self.lookup_timeout_ms))
    }
}
