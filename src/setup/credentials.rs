use anyhow::Result;

use crate::config::{OllamaMode, Target};
use crate::error::ConfigError;
use crate::ui::TerminalUi;

use super::ResolvedChoice;

/// Which key a provider needs and where it comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiKeySource {
    pub label: &'static str,
    pub env_var: &'static str,
}

pub const ANTHROPIC_KEY: ApiKeySource = ApiKeySource {
    label: "Anthropic",
    env_var: "ANTHROPIC_API_KEY",
};

pub const OPENAI_KEY: ApiKeySource = ApiKeySource {
    label: "OpenAI",
    env_var: "OPENAI_API_KEY",
};

pub const OLLAMA_CLOUD_KEY: ApiKeySource = ApiKeySource {
    label: "Ollama Cloud",
    env_var: "OLLAMA_API_KEY",
};

/// The credential `target` needs, or `None` for a local Ollama server.
pub fn key_source_for(target: Target) -> Option<ApiKeySource> {
    match target {
        Target::Anthropic => Some(ANTHROPIC_KEY),
        Target::OpenAi => Some(OPENAI_KEY),
        Target::Ollama(OllamaMode::Cloud) => Some(OLLAMA_CLOUD_KEY),
        Target::Ollama(OllamaMode::Local) => None,
    }
}

/// Pick an API key: environment first, then the saved key, then ask.
///
/// Without a terminal to ask on, a missing key is a configuration error
/// naming the environment variable to set.
pub fn resolve_api_key(
    env_key: Option<&str>,
    saved_key: Option<&str>,
    source: &ApiKeySource,
    ui: &mut dyn TerminalUi,
) -> Result<ResolvedChoice<String>> {
    if let Some(key) = non_blank(env_key) {
        log::debug!("Using {} from the environment", source.env_var);
        return Ok(ResolvedChoice::silent(key));
    }

    if let Some(key) = non_blank(saved_key) {
        log::debug!("Using saved {} API key", source.label);
        return Ok(ResolvedChoice::silent(key));
    }

    if !ui.is_interactive() {
        return Err(ConfigError::MissingApiKey {
            label: source.label,
            env_var: source.env_var,
        }
        .into());
    }

    let entered = ui.input(&format!("Enter your {} API key", source.label), None)?;
    match non_blank(Some(&entered)) {
        Some(key) => Ok(ResolvedChoice::prompted(key)),
        None => Err(ConfigError::EmptyApiKey.into()),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
