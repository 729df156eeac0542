use clap::{Args as ClapArgs, Parser, Subcommand};
use std::time::Duration;

pub const DEFAULT_DEEPSEEK_BASE: &str = "https://api.deepseek.com";
pub const DEFAULT_ALI_COMPAT_BASE: &str = "https://dashscope.aliyuncs.com/compatible-mode";

// Cache bounds
pub const MAX_CACHE: usize = 200;
pub const TTL_MS: u64 = 10 * 60 * 1000;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "fusion-gateway")]
#[command(about = "Caching, retrying proxy for idea-fusion suggestions")]
pub struct Args {
    #[command(flatten)]
    pub providers: ProviderConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fuse two concepts once through the client path and print the result
    Fuse(FuseArgs),
}

// Upstream credentials and endpoints. Keys are optional at startup.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ProviderConfig {
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub deepseek_api_key: Option<String>,

    #[arg(long, env = "DEEPSEEK_BASE", default_value = DEFAULT_DEEPSEEK_BASE)]
    pub deepseek_base: String,

    #[arg(long, env = "ALI_API_KEY", hide_env_values = true)]
    pub ali_api_key: Option<String>,

    #[arg(long, env = "ALI_COMPAT_BASE", default_value = DEFAULT_ALI_COMPAT_BASE)]
    pub ali_compat_base: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServerConfig {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 7070)]
    pub port: u16,

    // Max cached suggestions
    #[arg(long, env = "FUSION_CACHE_CAPACITY", default_value_t = MAX_CACHE)]
    pub cache_capacity: usize,

    // Cache TTL in seconds
    #[arg(short, long, env = "FUSION_CACHE_TTL", default_value_t = TTL_MS / 1000)]
    pub cache_ttl: u64,

    // Retries after the first upstream attempt
    #[arg(long, env = "FUSION_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: u32,

    // Linear backoff step in milliseconds
    #[arg(long, env = "FUSION_RETRY_DELAY_MS", default_value_t = 500)]
    pub retry_delay_ms: u64,

    // Per-attempt upstream deadline in seconds
    #[arg(long, env = "FUSION_UPSTREAM_TIMEOUT", default_value_t = 30)]
    pub upstream_timeout: u64,

    // Rate limit max requests per window, 0 disables
    #[arg(long, env = "FUSION_RATE_LIMIT", default_value_t = 120)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "FUSION_RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // Key the rate limit on x-forwarded-for; only behind a trusted proxy
    #[arg(long, env = "FUSION_TRUST_PROXY")]
    pub trust_proxy: bool,
}

impl ServerConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7070,
            cache_capacity: MAX_CACHE,
            cache_ttl: TTL_MS / 1000,
            max_retries: 2,
            retry_delay_ms: 500,
            upstream_timeout: 30,
            rate_limit: 120,
            rate_window: 60,
            trust_proxy: false,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FuseArgs {
    pub a: String,
    pub b: String,

    // Free-text augmentation appended to the user prompt
    #[arg(long)]
    pub prompt: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub detail: bool,

    // "fusion" or "pitch"
    #[arg(long)]
    pub agent: Option<String>,

    // "zh" or "en"
    #[arg(long)]
    pub language: Option<String>,

    // Backend proxy base URL; when absent the provider is called directly
    #[arg(long, env = "FUSION_API_URL")]
    pub backend: Option<String>,

    #[arg(long)]
    pub timeout_ms: Option<u64>,
}
