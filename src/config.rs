//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (path overridable via `BUNKO_CONFIG`), then applies the
//! `BUNKO_LOG_LEVEL` env override. Every field has a default, so a missing
//! config file resolves to the built-in defaults rather than an error.

use std::{env, fs, path::Path};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM provider configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (e.g. `"dummy"`, `"openai"`).
    /// Maps to `default` in `[llm]` TOML — named `default` there to signal
    /// that other provider sections can coexist without being loaded.
    pub provider: String,
    /// Config for the OpenAI / OpenAI-compatible provider (`[llm.openai]`).
    pub openai: OpenAiConfig,
}

/// Chat console configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// System prompt seeding every transcript.
    pub system_prompt: String,
}

/// Library desk configuration.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Maximum concurrently unreturned loans per member.
    pub loan_limit: usize,
    /// Fine per overdue day, in currency units.
    pub fine_per_day: u64,
    /// Date stamped on new loans.
    pub borrow_date: NaiveDate,
    /// Due date stamped on new loans.
    pub due_date: NaiveDate,
    /// The fixed "today" used for fine calculation.
    pub today: NaiveDate,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    pub library: LibraryConfig,
    /// API key from `OPENAI_API_KEY` env var — never sourced from TOML.
    pub api_key: Option<String>,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    app: RawApp,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    chat: RawChat,
    #[serde(default)]
    library: RawLibrary,
}

#[derive(Deserialize)]
struct RawApp {
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawApp {
    fn default() -> Self {
        Self { log_level: default_log_level() }
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
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawChat {
    #[serde(default = "default_system_prompt")]
    system_prompt: String,
}

impl Default for RawChat {
    fn default() -> Self {
        Self { system_prompt: default_system_prompt() }
    }
}

#[derive(Deserialize)]
struct RawLibrary {
    #[serde(default = "default_loan_limit")]
    loan_limit: usize,
    #[serde(default = "default_fine_per_day")]
    fine_per_day: u64,
    #[serde(default = "default_borrow_date")]
    borrow_date: String,
    #[serde(default = "default_due_date")]
    due_date: String,
    #[serde(default = "default_today")]
    today: String,
}

impl Default for RawLibrary {
    fn default() -> Self {
        Self {
            loan_limit: default_loan_limit(),
            fine_per_day: default_fine_per_day(),
            borrow_date: default_borrow_date(),
            due_date: default_due_date(),
            today: default_today(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_openai_temperature() -> f32 { 0.7 }
fn default_openai_timeout_seconds() -> u64 { 60 }
fn default_system_prompt() -> String {
    "You are a health expert. Answer the user's questions.".to_string()
}
fn default_loan_limit() -> usize { 5 }
fn default_fine_per_day() -> u64 { 100 }
fn default_borrow_date() -> String { "2024-11-24".to_string() }
fn default_due_date() -> String { "2024-12-01".to_string() }
fn default_today() -> String { "2024-12-24".to_string() }

/// Load config from `config/default.toml` (or `BUNKO_CONFIG`), then apply
/// env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let path = env::var("BUNKO_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let log_level_override = env::var("BUNKO_LOG_LEVEL").ok();
    load_from(Path::new(&path), log_level_override.as_deref())
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, log_level_override: Option<&str>) -> Result<Config, AppError> {
    let parsed: RawConfig = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?,
        // No config file: every field has a default.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
        Err(e) => {
            return Err(AppError::Config(format!("cannot read {}: {e}", path.display())));
        }
    };

    let log_level = log_level_override
        .map(str::to_string)
        .unwrap_or(parsed.app.log_level);

    Ok(Config {
        log_level,
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        chat: ChatConfig {
            system_prompt: parsed.chat.system_prompt,
        },
        library: LibraryConfig {
            loan_limit: parsed.library.loan_limit,
            fine_per_day: parsed.library.fine_per_day,
            borrow_date: parse_date(&parsed.library.borrow_date, "library.borrow_date")?,
            due_date: parse_date(&parsed.library.due_date, "library.due_date")?,
            today: parse_date(&parsed.library.today, "library.today")?,
        },
        api_key: env::var("OPENAI_API_KEY").ok(),
    })
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::Config(format!("{field}: invalid date '{value}': {e}")))
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy LLM, no API keys, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            log_level: "info".into(),
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            chat: ChatConfig {
                system_prompt: "You are a test assistant.".into(),
            },
            library: LibraryConfig {
                loan_limit: 5,
                fine_per_day: 100,
                borrow_date: NaiveDate::from_ymd_opt(2024, 11, 24).unwrap(),
                due_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
                today: NaiveDate::from_ymd_opt(2024, 12, 24).unwrap(),
            },
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[app]
log_level = "debug"

[llm]
default = "dummy"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.llm.provider, "dummy");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = load_from(Path::new("/nonexistent/config.toml"), None).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.openai.model, "gpt-4o-mini");
        assert_eq!(cfg.library.loan_limit, 5);
        assert_eq!(cfg.library.fine_per_day, 100);
        assert_eq!(cfg.library.today, NaiveDate::from_ymd_opt(2024, 12, 24).unwrap());
    }

    #[test]
    fn malformed_toml_errors() {
        let f = write_toml("[app\nlog_level=");
        let result = load_from(f.path(), None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("config error"));
    }

    #[test]
    fn invalid_date_errors() {
        let f = write_toml("[library]\ntoday = \"24-12-2024\"\n");
        let result = load_from(f.path(), None);
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("library.today"), "got: {msg}");
    }

    #[test]
    fn env_log_level_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("trace")).unwrap();
        assert_eq!(cfg.log_level, "trace");
    }

    #[test]
    fn openai_section_round_trips() {
        let f = write_toml(
            r#"
[llm]
default = "openai"

[llm.openai]
api_base_url = "http://localhost:11434/v1/chat/completions"
model = "llama3"
temperature = 0.2
timeout_seconds = 10
"#,
        );
        let cfg = load_from(f.path(), None).unwrap();
        assert_eq!(cfg.llm.openai.model, "llama3");
        assert_eq!(cfg.llm.openai.temperature, 0.2);
        assert_eq!(cfg.llm.openai.timeout_seconds, 10);
    }

    #[test]
    fn library_dates_parse() {
        let f = write_toml(
            r#"
[library]
loan_limit = 3
fine_per_day = 50
borrow_date = "2025-01-01"
due_date = "2025-01-08"
today = "2025-01-10"
"#,
        );
        let cfg = load_from(f.path(), None).unwrap();
        assert_eq!(cfg.library.loan_limit, 3);
        assert_eq!(cfg.library.due_date, NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());
    }
}
