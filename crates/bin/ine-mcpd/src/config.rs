use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ine_core::ControlOptions;
use ine_core::upstream::ClientConfig;
use ine_mcp::server::McpHttpServerConfig;
use ine_models::schema::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4030";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
const DEFAULT_MAX_CONCURRENCY: usize = 4;
const DEFAULT_LATEST_TABLE_LIMIT: usize = 3;
const DEFAULT_MAX_RESULTS: usize = 10;
const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;

const LANGUAGES: [&str; 2] = ["ES", "EN"];

#[derive(Parser, Debug)]
#[command(name = "ine-mcpd", version, about = "INE statistics MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "INE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "INE_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    language: String,

    #[arg(
        long,
        env = "INE_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    #[arg(long, env = "INE_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    #[arg(
        long,
        env = "INE_RETRY_BACKOFF_MS",
        default_value_t = DEFAULT_RETRY_BACKOFF_MS
    )]
    retry_backoff_ms: u64,

    #[arg(
        long,
        env = "INE_MAX_CONCURRENCY",
        default_value_t = DEFAULT_MAX_CONCURRENCY
    )]
    max_concurrency: usize,

    #[arg(
        long,
        env = "INE_LATEST_TABLE_LIMIT",
        default_value_t = DEFAULT_LATEST_TABLE_LIMIT
    )]
    latest_table_limit: usize,

    #[arg(long, env = "INE_DEFAULT_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    default_max_results: usize,

    #[arg(
        long = "stdio",
        env = "INE_ENABLE_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "INE_MCP_SERVE",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "INE_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "INE_MCP_STATELESS",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    mcp_stateless: bool,

    /// Seconds between SSE keep-alive pings; 0 disables them.
    #[arg(
        long,
        env = "INE_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS
    )]
    sse_keep_alive_secs: u64,

    #[arg(long, env = "INE_LOG")]
    log: Option<String>,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone, Debug)]
pub struct IneConfig {
    pub client: ClientConfig,
    pub control: ControlOptions,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub http: McpHttpServerConfig,
    /// Explicit `tracing` filter; `RUST_LOG` applies when unset.
    pub log_filter: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl IneConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for IneConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let base_url = args.base_url.trim().to_string();
        if base_url.is_empty() {
            return Err(ConfigError::MissingSetting("INE_BASE_URL"));
        }
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(ConfigError::InvalidSetting {
                name: "INE_BASE_URL",
                value: args.base_url,
            });
        }

        let language = args.language.trim().to_ascii_uppercase();
        if !LANGUAGES.contains(&language.as_str()) {
            return Err(ConfigError::InvalidSetting {
                name: "INE_LANGUAGE",
                value: args.language,
            });
        }

        if args.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "INE_REQUEST_TIMEOUT_SECS",
                value: args.request_timeout_secs.to_string(),
            });
        }
        if args.max_concurrency == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "INE_MAX_CONCURRENCY",
                value: args.max_concurrency.to_string(),
            });
        }
        if args.default_max_results == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "INE_DEFAULT_MAX_RESULTS",
                value: args.default_max_results.to_string(),
            });
        }
        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::InvalidSetting {
                name: "INE_MCP_SERVE",
                value: "false with INE_ENABLE_STDIO=false leaves nothing to serve".to_string(),
            });
        }

        let client = ClientConfig::new(base_url)
            .with_language(language)
            .with_request_timeout(Duration::from_secs(args.request_timeout_secs))
            .with_max_retries(args.max_retries)
            .with_retry_backoff(Duration::from_millis(args.retry_backoff_ms));
        let control = ControlOptions::new()
            .with_max_concurrency(args.max_concurrency)
            .with_latest_table_limit(args.latest_table_limit)
            .with_default_max_results(args.default_max_results);
        let sse_keep_alive = (args.sse_keep_alive_secs > 0)
            .then_some(Duration::from_secs(args.sse_keep_alive_secs));
        let http = McpHttpServerConfig::new(args.mcp_http_addr)
            .with_stateful_mode(!args.mcp_stateless)
            .with_sse_keep_alive(sse_keep_alive);
        let log_filter = args.log.filter(|value| !value.trim().is_empty());

        Ok(Self {
            client,
            control,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            http,
            log_filter,
        })
    }
}
