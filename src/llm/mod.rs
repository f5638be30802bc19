pub mod anthropic;
pub mod ollama;
pub mod openai;
mod prompt_builder;
mod prompts;

pub use prompt_builder::{clean_response, commit_message_prompt, PromptPair};

use crate::config::{RunConfig, Target};
use crate::error::ProviderError;

use anthropic::AnthropicClient;
use ollama::OllamaClient;
use openai::OpenAiClient;

/// A backend that turns a staged diff into a commit message.
pub trait CompletionProvider {
    fn generate(&self, diff: &str, config: &RunConfig) -> Result<String, ProviderError>;
}

/// Lists the models installed on an Ollama server.
pub trait ModelInventory {
    /// Model names in the order the server returned them.
    fn installed_models(&self, chat_endpoint: &str) -> Result<Vec<String>, ProviderError>;
}

/// Hands out the completion client for a resolved run.
pub trait ProviderFactory {
    fn client_for(&self, config: &RunConfig) -> Box<dyn CompletionProvider>;
}

/// The real HTTP-backed providers.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpProviders;

impl ProviderFactory for HttpProviders {
    fn client_for(&self, config: &RunConfig) -> Box<dyn CompletionProvider> {
        log::debug!("Using {} with model {}", config.target, config.model);

        match config.target {
            Target::Ollama(_) => Box::new(OllamaClient::new()),
            Target::Anthropic => Box::new(AnthropicClient::new()),
            Target::OpenAi => Box::new(OpenAiClient::new()),
        }
    }
}

impl ModelInventory for HttpProviders {
    fn installed_models(&self, chat_endpoint: &str) -> Result<Vec<String>, ProviderError> {
        OllamaClient::new().installed_models(chat_endpoint)
    }
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...\n[truncated {} bytes]", &s[..cut], s.len() - cut)
}

/// Blocking HTTP client shared by every provider.
///
/// No request timeout: a slow model blocks until the transport gives up.
pub(crate) fn http_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(None)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {e}");
            reqwest::blocking::Client::new()
        })
}
