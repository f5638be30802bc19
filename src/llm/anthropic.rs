use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::{AnthropicError, ProviderError};

use super::{clean_response, commit_message_prompt, http_client, truncate, CompletionProvider};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Request body for the Anthropic Messages API.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<UserMessage<'a>>,
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Anthropic-based implementation of CompletionProvider.
pub struct AnthropicClient {
    client: Client,
}

impl AnthropicClient {
    pub fn new() -> Self {
        AnthropicClient {
            client: http_client(),
        }
    }
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionProvider for AnthropicClient {
    fn generate(&self, diff: &str, config: &RunConfig) -> Result<String, ProviderError> {
        let prompts = commit_message_prompt(diff);
        let req = MessagesRequest {
            model: &config.model,
            max_tokens: MAX_TOKENS,
            system: &prompts.system,
            messages: vec![UserMessage {
                role: "user",
                content: &prompts.user,
            }],
        };

        if config.debug {
            log::debug!("Calling Anthropic model {:?} at {}", config.model, config.endpoint);
            log::debug!("Anthropic user prompt:\n{}", truncate(&prompts.user, 3000));
        }

        let resp = self
            .client
            .post(&config.endpoint)
            .header("x-api-key", config.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&req)
            .send()
            .map_err(AnthropicError::Connection)?;

        let status = resp.status();
        let text = resp.text().map_err(AnthropicError::Connection)?;

        if config.debug {
            log::debug!("Anthropic raw response: {}", truncate(&text, 3000));
        }

        if !status.is_success() {
            return Err(AnthropicError::Status {
                status: status.as_u16(),
                body: text.trim().to_string(),
            }
            .into());
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| AnthropicError::MalformedResponse(format!("invalid JSON: {e}")))?;

        if let Some(usage) = &parsed.usage {
            log::debug!(
                "Token usage: input={}, output={}",
                usage.input_tokens,
                usage.output_tokens
            );
        }

        let content = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| AnthropicError::MalformedResponse("missing content[0].text".to_string()))?;

        Ok(clean_response(&content))
    }
}
