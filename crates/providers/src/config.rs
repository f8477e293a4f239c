use crate::error::{ProviderError, Result};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_CHAT_PROVIDER: &str = "bigmodel";
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "bigmodel";
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Built-in defaults for one OpenAI-compatible provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub name: &'static str,
    pub base_url: &'static str,
    pub chat_model: &'static str,
    pub embedding_model: Option<&'static str>,
}

pub const KNOWN_PROVIDERS: [ProviderDefaults; 4] = [
    ProviderDefaults {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        chat_model: "gpt-3.5-turbo",
        embedding_model: Some("text-embedding-3-small"),
    },
    ProviderDefaults {
        name: "deepseek",
        base_url: "https://api.deepseek.com",
        chat_model: "deepseek-chat",
        embedding_model: None,
    },
    ProviderDefaults {
        name: "qwen",
        base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1",
        chat_model: "qwen-turbo",
        embedding_model: Some("text-embedding-v3"),
    },
    ProviderDefaults {
        name: "bigmodel",
        base_url: "https://open.bigmodel.cn/api/paas/v4",
        chat_model: "glm-4-flash",
        embedding_model: Some("embedding-3-pro"),
    },
];

/// Look up a provider by name, case-insensitively
pub fn provider_defaults(name: &str) -> Result<&'static ProviderDefaults> {
    let wanted = name.trim().to_ascii_lowercase();
    KNOWN_PROVIDERS
        .iter()
        .find(|p| p.name == wanted)
        .ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))
}

/// Resolved endpoint for one gateway
#[derive(Clone, Serialize)]
pub struct ProviderSettings {
    pub provider: String,
    pub base_url: String,
    #[serde(skip)]
    pub api_key: String,
    pub model: String,
    #[serde(skip)]
    pub timeout: Duration,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderSettings {
    /// Chat settings from the process environment.
    ///
    /// `provider` overrides `DEFAULT_AI_PROVIDER`.
    pub fn chat_from_env(provider: Option<&str>) -> Result<Self> {
        Self::chat_from_lookup(provider, env_var)
    }

    /// Chat settings from an arbitrary variable source.
    ///
    /// Reads `<PROVIDER>_API_KEY` (falling back to `LLM_API_KEY`),
    /// `<PROVIDER>_BASE_URL` and `<PROVIDER>_MODEL`.
    pub fn chat_from_lookup<F>(provider: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = non_empty(lookup);
        let name = provider
            .map(str::to_string)
            .or_else(|| lookup("DEFAULT_AI_PROVIDER"))
            .unwrap_or_else(|| DEFAULT_CHAT_PROVIDER.to_string());
        let defaults = provider_defaults(&name)?;
        let prefix = defaults.name.to_ascii_uppercase();

        let api_key = lookup(&format!("{prefix}_API_KEY"))
            .or_else(|| lookup("LLM_API_KEY"))
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider: defaults.name.to_string(),
            })?;
        let base_url = lookup(&format!("{prefix}_BASE_URL"))
            .unwrap_or_else(|| defaults.base_url.to_string());
        let model =
            lookup(&format!("{prefix}_MODEL")).unwrap_or_else(|| defaults.chat_model.to_string());

        Ok(Self {
            provider: defaults.name.to_string(),
            base_url,
            api_key,
            model,
            timeout: HTTP_TIMEOUT,
        })
    }

    /// Embedding settings from the process environment
    pub fn embedding_from_env() -> Result<Self> {
        Self::embedding_from_lookup(env_var)
    }

    /// Embedding settings from an arbitrary variable source.
    ///
    /// `EMBEDDING_*` variables win over the provider's own variables, which
    /// win over built-in defaults.
    pub fn embedding_from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = non_empty(lookup);
        let name = lookup("EMBEDDING_PROVIDER")
            .unwrap_or_else(|| DEFAULT_EMBEDDING_PROVIDER.to_string());
        let defaults = provider_defaults(&name)?;
        let prefix = defaults.name.to_ascii_uppercase();

        let api_key = lookup("EMBEDDING_API_KEY")
            .or_else(|| lookup(&format!("{prefix}_API_KEY")))
            .or_else(|| lookup("LLM_API_KEY"))
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider: defaults.name.to_string(),
            })?;
        let model = lookup("EMBEDDING_MODEL")
            .or_else(|| defaults.embedding_model.map(str::to_string))
            .ok_or_else(|| ProviderError::MissingModel {
                provider: defaults.name.to_string(),
            })?;
        let base_url = lookup("EMBEDDING_BASE_URL")
            .or_else(|| lookup(&format!("{prefix}_BASE_URL")))
            .unwrap_or_else(|| defaults.base_url.to_string());

        Ok(Self {
            provider: defaults.name.to_string(),
            base_url,
            api_key,
            model,
            timeout: HTTP_TIMEOUT,
        })
    }

    /// `base_url` joined with `path`, without doubled slashes
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Treat blank values as unset
fn non_empty<F>(lookup: F) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn chat_uses_provider_key_then_unified_key() {
        let settings =
            ProviderSettings::chat_from_lookup(Some("DeepSeek"), vars(&[("LLM_API_KEY", "k1")]))
                .unwrap();
        assert_eq!(settings.provider, "deepseek");
        assert_eq!(settings.api_key, "k1");
        assert_eq!(settings.model, "deepseek-chat");
        assert_eq!(settings.base_url, "https://api.deepseek.com");
        assert_eq!(settings.timeout, HTTP_TIMEOUT);

        let settings = ProviderSettings::chat_from_lookup(
            None,
            vars(&[
                ("DEFAULT_AI_PROVIDER", "openai"),
                ("OPENAI_API_KEY", "own"),
                ("LLM_API_KEY", "shared"),
                ("OPENAI_MODEL", "gpt-4o"),
                ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.api_key, "own");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(
            settings.endpoint("/chat/completions"),
            "http://localhost:9000/v1/chat/completions"
        );
    }

    #[test]
    fn chat_defaults_to_bigmodel() {
        let settings = ProviderSettings::chat_from_lookup(None, vars(&[("LLM_API_KEY", "k")]))
            .unwrap();
        assert_eq!(settings.provider, "bigmodel");
        assert_eq!(settings.model, "glm-4-flash");
    }

    #[test]
    fn missing_key_fails_fast() {
        let err = ProviderSettings::chat_from_lookup(Some("qwen"), vars(&[("LLM_API_KEY", "  ")]))
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey { provider } if provider == "qwen"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = ProviderSettings::chat_from_lookup(Some("acme"), vars(&[("LLM_API_KEY", "k")]))
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider(name) if name == "acme"));
    }

    #[test]
    fn embedding_layers_variables() {
        let settings = ProviderSettings::embedding_from_lookup(vars(&[
            ("BIGMODEL_API_KEY", "bm"),
            ("BIGMODEL_BASE_URL", "http://bm.local"),
        ]))
        .unwrap();
        assert_eq!(settings.provider, "bigmodel");
        assert_eq!(settings.api_key, "bm");
        assert_eq!(settings.model, "embedding-3-pro");
        assert_eq!(settings.base_url, "http://bm.local");

        let settings = ProviderSettings::embedding_from_lookup(vars(&[
            ("EMBEDDING_PROVIDER", "openai"),
            ("EMBEDDING_API_KEY", "emb"),
            ("OPENAI_API_KEY", "chat"),
            ("EMBEDDING_BASE_URL", "http://emb.local"),
        ]))
        .unwrap();
        assert_eq!(settings.api_key, "emb");
        assert_eq!(settings.model, "text-embedding-3-small");
        assert_eq!(settings.base_url, "http://emb.local");
    }

    #[test]
    fn embedding_without_model_fails_fast() {
        let err = ProviderSettings::embedding_from_lookup(vars(&[
            ("EMBEDDING_PROVIDER", "deepseek"),
            ("LLM_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ProviderError::MissingModel { provider } if provider == "deepseek"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let settings =
            ProviderSettings::chat_from_lookup(None, vars(&[("LLM_API_KEY", "secret")])).unwrap();
        assert!(!format!("{settings:?}").contains("secret"));
    }
}
