use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

/**
 * \brief 中继服务的不可变配置，启动时读取一次，经由 State 注入处理器。
 */
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /** \brief 监听地址 */
    pub bind_addr: String,
    /** \brief Provider 凭据；未设置时 /api/chat 返回 500 */
    pub api_key: Option<String>,
    /** \brief API 基地址 */
    pub api_base: String,
    /** \brief 客户端未指定时使用的模型 */
    pub default_model: String,
    /** \brief 上游调用截止时间；None 表示不限时 */
    pub timeout: Option<Duration>,
}

impl RelayConfig {
    /**
     * \brief 从环境变量读取配置。
     *
     * | 变量                     | 默认值                     |
     * |--------------------------|----------------------------|
     * | `OPENAI_API_KEY`         | 无                         |
     * | `OPENAI_MODEL`           | `gpt-4o-mini`              |
     * | `OPENAI_API_BASE`        | `https://api.openai.com`   |
     * | `CHATRELAY_TIMEOUT_SECS` | `25`（`0` 表示不限时）     |
     * | `CHATRELAY_ADDR`         | `127.0.0.1:3000`           |
     */
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("CHATRELAY_ADDR", DEFAULT_ADDR),
            api_key: non_empty_env("OPENAI_API_KEY"),
            api_base: env_or("OPENAI_API_BASE", DEFAULT_API_BASE),
            default_model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
            timeout: parse_timeout(std::env::var("CHATRELAY_TIMEOUT_SECS").ok().as_deref()),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    non_empty_env(name).unwrap_or_else(|| default.to_string())
}

fn parse_timeout(raw: Option<&str>) -> Option<Duration> {
    let secs = raw
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    (secs > 0).then(|| Duration::from_secs(secs))
}
