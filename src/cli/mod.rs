use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Session Store Args ---
    /// Session store type (redis, memory)
    #[arg(long, env = "STORE_TYPE", default_value = "redis")]
    pub store_type: String,

    /// Session store host endpoint (e.g., redis://127.0.0.1:6379)
    #[arg(long, env = "STORE_HOST", default_value = "redis://127.0.0.1:6379")]
    pub store_host: String,

    /// Prefix for Redis session and message keys.
    #[arg(long, env = "STORE_REDIS_PREFIX", default_value = "mentor:")]
    pub store_redis_prefix: String,

    // --- Provider Selection Args ---
    /// Preferred text provider (deepseek, gpt-oss, openai, anthropic, auto)
    #[arg(long, env = "DEFAULT_PROVIDER", default_value = "auto")]
    pub default_provider: String,

    // --- DeepSeek Provider Args ---
    /// API Key for DeepSeek; leave unset to skip this provider
    #[arg(long, env = "DEEPSEEK_API_KEY")]
    pub deepseek_api_key: Option<String>,

    /// Model name for DeepSeek (e.g., deepseek-chat)
    #[arg(long, env = "DEEPSEEK_MODEL")] // No default, rely on adapter defaults if None
    pub deepseek_model: Option<String>,

    /// Base URL for the DeepSeek API
    #[arg(long, env = "DEEPSEEK_BASE_URL")]
    pub deepseek_base_url: Option<String>,

    // --- gpt-oss Provider Args ---
    /// API Key for the gpt-oss host; leave unset to skip this provider
    #[arg(long, env = "GPT_OSS_API_KEY")]
    pub gpt_oss_api_key: Option<String>,

    /// Model name for gpt-oss (e.g., openai/gpt-oss-120b)
    #[arg(long, env = "GPT_OSS_MODEL")]
    pub gpt_oss_model: Option<String>,

    /// Base URL for the gpt-oss host API
    #[arg(long, env = "GPT_OSS_BASE_URL")]
    pub gpt_oss_base_url: Option<String>,

    // --- OpenAI Provider Args ---
    /// API Key for OpenAI; leave unset to skip this provider
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Model name for OpenAI (e.g., gpt-4o)
    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,

    /// Base URL for the OpenAI API
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    // --- Anthropic Provider Args ---
    /// API Key for Anthropic; leave unset to skip this provider
    #[arg(long, env = "ANTHROPIC_API_KEY")]
    pub anthropic_api_key: Option<String>,

    /// Model name for Anthropic (e.g., claude-3-5-sonnet-20241022)
    #[arg(long, env = "ANTHROPIC_MODEL")]
    pub anthropic_model: Option<String>,

    /// Base URL for the Anthropic API
    #[arg(long, env = "ANTHROPIC_BASE_URL")]
    pub anthropic_base_url: Option<String>,

    // --- General App Args ---
    /// Owner identifier attached to sessions started from this process
    #[arg(long, env = "OWNER_ID")]
    pub owner_id: Option<String>,
}
