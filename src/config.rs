//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory (or
//! the path given with `-f`), then applies the `RELAY_BOT_LOG_LEVEL` override.
//! Credentials come from `TELEGRAM_BOT_TOKEN` and `OPENAI_API_KEY` and are
//! never sourced from TOML.

use std::{
    env, fs,
    path::Path,
};

use serde::Deserialize;

use crate::error::AppError;
use crate::logger;

/// Config file used when no `-f` path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const LLM_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const LOG_LEVEL_ENV: &str = "RELAY_BOT_LOG_LEVEL";

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Whether the Telegram channel is started.
    pub enabled: bool,
}

/// OpenAI / OpenAI-compatible completions provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full completions endpoint URL.
    pub api_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"openai"` or `"dummy"`).
    /// Maps to `default` in `[llm]` TOML.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Fully-resolved process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub log_level: String,
    pub telegram: TelegramConfig,
    pub llm: LlmConfig,
    /// From `TELEGRAM_BOT_TOKEN`.
    pub telegram_token: Option<String>,
    /// From `OPENAI_API_KEY` — `None` is fine for the dummy provider.
    pub llm_api_key: Option<String>,
}

impl Config {
    /// Returns `true` if the Telegram channel should be loaded.
    pub fn comms_telegram_should_load(&self) -> bool {
        self.telegram.enabled
    }

    /// The bot token, or a config error naming the missing variable.
    pub fn telegram_token(&self) -> Result<&str, AppError> {
        self.telegram_token
            .as_deref()
            .ok_or_else(|| AppError::Config(format!("{TELEGRAM_TOKEN_ENV} is not set")))
    }
}

/// Values read from the process environment.
///
/// Kept separate from the loader so tests can pass them in directly instead
/// of mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub telegram_token: Option<String>,
    pub llm_api_key: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            log_level: non_empty_var(LOG_LEVEL_ENV),
            telegram_token: non_empty_var(TELEGRAM_TOKEN_ENV),
            llm_api_key: non_empty_var(LLM_API_KEY_ENV),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    bot: RawBot,
    #[serde(default)]
    telegram: RawTelegram,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawBot {
    #[serde(default = "default_bot_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawBot {
    fn default() -> Self {
        Self { name: default_bot_name(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawTelegram {
    /// Defaults to `true`: Telegram is the only channel.
    #[serde(default = "default_true")]
    enabled: bool,
}

impl Default for RawTelegram {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_url")]
    api_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_url: default_openai_api_url(),
            model: default_openai_model(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

fn default_bot_name() -> String { "relay-bot".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_url() -> String { "https://api.openai.com/v1/completions".to_string() }
fn default_openai_model() -> String { "gpt-3.5-turbo-instruct".to_string() }
fn default_openai_timeout_seconds() -> u64 { 30 }

fn default_true() -> bool {
    true
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from `config_path`, or `config/default.toml`, then apply env
/// overrides. If no path is given and the default file does not exist, the
/// built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let env = EnvOverrides::from_env();
    match config_path {
        Some(path) => load_from(Some(Path::new(path)), &env),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_from(Some(default), &env)
            } else {
                load_from(None, &env)
            }
        }
    }
}

/// Internal loader — accepts an explicit path (or `None` for built-in
/// defaults) and the environment values to apply.
pub fn load_from(path: Option<&Path>, env: &EnvOverrides) -> Result<Config, AppError> {
    let parsed: RawConfig = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
            toml::from_str(&raw)
                .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
        }
        None => RawConfig::default(),
    };

    if parsed.llm.openai.timeout_seconds == 0 {
        return Err(AppError::Config("llm.openai.timeout_seconds must be greater than 0".into()));
    }

    let log_level = env.log_level.clone().unwrap_or(parsed.bot.log_level);
    logger::parse_level(&log_level)
        .map_err(|_| AppError::Config(format!("invalid log level '{log_level}' (expected error, warn, info, debug or trace)")))?;

    Ok(Config {
        bot_name: parsed.bot.name,
        log_level,
        telegram: TelegramConfig { enabled: parsed.telegram.enabled },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_url: parsed.llm.openai.api_url,
                model: parsed.llm.openai.model,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        telegram_token: env.telegram_token.clone(),
        llm_api_key: env.llm_api_key.clone(),
    })
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy LLM, no credentials, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            bot_name: "test".into(),
            log_level: "info".into(),
            telegram: TelegramConfig { enabled: false },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_url: "http://localhost:0/v1/completions".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                },
            },
            telegram_token: None,
            llm_api_key: None,
        }
    }
}
