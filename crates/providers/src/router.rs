//! Provider router: builds the LLM provider selected on the command line.

use std::sync::Arc;
use std::time::Duration;
use shopbot_config::AppConfig;
use shopbot_core::error::ProviderError;
use shopbot_core::provider::Provider;
use crate::gigachat::GigaChatProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider called `name` from configuration.
///
/// Fails when the provider is unknown or has no credentials.
pub fn build_provider(config: &AppConfig, name: &str) -> Result<Arc<dyn Provider>, ProviderError> {
    let settings = config.provider(name);
    let timeout = Duration::from_secs(settings.timeout_secs());

    let api_key = settings.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(format!(
            "no API key for '{name}' (set {} or providers.{name}.api_key)",
            key_env_var(name)
        ))
    })?;

    let provider: Arc<dyn Provider> = match name {
        "openrouter" => {
            let base_url = settings
                .api_url
                .clone()
                .unwrap_or_else(|| default_base_url(name));
            Arc::new(OpenAiCompatProvider::with_timeout(name, base_url, api_key, timeout))
        }
        "gigachat" => {
            let mut p = GigaChatProvider::with_options(api_key, timeout, settings.accepts_invalid_certs(name));
            if let Some(url) = &settings.api_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        other => {
            return Err(ProviderError::NotConfigured(format!(
                "unknown provider '{other}'"
            )));
        }
    };

    Ok(provider)
}

/// Environment variable that carries the key for a provider.
pub fn key_env_var(provider_name: &str) -> &'static str {
    match provider_name {
        "gigachat" => "GIGACHAT_CREDENTIALS",
        _ => "OPENROUTER_API_KEY",
    }
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "gigachat" => crate::gigachat::DEFAULT_BASE_URL.into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
