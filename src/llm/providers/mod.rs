//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from `OPENAI_API_KEY` env (never TOML). The `openai`
/// backend requires it; `dummy` is keyless.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "openai" | "openai-compatible" => {
            let key = api_key.ok_or_else(|| ProviderError::MissingApiKey(config.provider.clone()))?;
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.temperature,
                oai.timeout_seconds,
                key,
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn builds_dummy_without_key() {
        let cfg = Config::test_default();
        let p = build(&cfg.llm, None).unwrap();
        assert!(matches!(p, LlmProvider::Dummy(_)));
    }

    #[test]
    fn openai_requires_key() {
        let mut cfg = Config::test_default();
        cfg.llm.provider = "openai".into();
        let result = build(&cfg.llm, None);
        assert!(matches!(result, Err(ProviderError::MissingApiKey(_))));
    }

    #[test]
    fn openai_builds_with_key() {
        let mut cfg = Config::test_default();
        cfg.llm.provider = "openai".into();
        let p = build(&cfg.llm, Some("sk-test".into())).unwrap();
        assert!(matches!(p, LlmProvider::OpenAiCompatible(_)));
    }

    #[test]
    fn unknown_provider_errors() {
        let mut cfg = Config::test_default();
        cfg.llm.provider = "mystery".into();
        let result = build(&cfg.llm, None);
        assert!(matches!(result, Err(ProviderError::UnknownProvider(_))));
    }
}
