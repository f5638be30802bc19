use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ollama_tags_endpoint, RunConfig};
use crate::error::{OllamaError, ProviderError};

use super::{clean_response, commit_message_prompt, http_client, truncate, CompletionProvider};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

/// Synchronous Ollama client using /api/chat and /api/tags.
///
/// Serves both a local server and Ollama Cloud; the cloud differs only in
/// its endpoint and the bearer token.
pub struct OllamaClient {
    http: Client,
}

impl OllamaClient {
    pub fn new() -> Self {
        Self {
            http: http_client(),
        }
    }

    /// Names of the models installed on the server behind `chat_endpoint`.
    pub fn installed_models(&self, chat_endpoint: &str) -> Result<Vec<String>, ProviderError> {
        let url = ollama_tags_endpoint(chat_endpoint);
        log::debug!("Listing Ollama models from {url}");

        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|source| OllamaError::Connection {
                url: url.clone(),
                source,
            })?;

        let text = read_success_body(resp, &url)?;
        let parsed: TagsResponse = serde_json::from_str(&text)
            .map_err(|e| OllamaError::MalformedResponse(format!("invalid model list: {e}")))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    fn chat(&self, system_prompt: &str, user_prompt: &str, config: &RunConfig) -> Result<String, OllamaError> {
        let url = config.endpoint.as_str();
        let req_body = ChatRequest {
            model: &config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream: false,
        };

        if config.debug {
            log::debug!("Ollama request to {url} (model {})", config.model);
            log::debug!("Ollama user prompt:\n{}", truncate(user_prompt, 3000));
        }

        let mut request = self.http.post(url).json(&req_body);
        if let Some(key) = &config.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().map_err(|source| OllamaError::Connection {
            url: url.to_string(),
            source,
        })?;

        let text = read_success_body(resp, url)?;

        if config.debug {
            log::debug!("Ollama raw JSON response: {}", truncate(&text, 3000));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| OllamaError::MalformedResponse(format!("invalid JSON: {e}")))?;

        parsed
            .message
            .and_then(|m| m.content)
            .map(|content| clean_response(&content))
            .ok_or_else(|| OllamaError::MalformedResponse("missing message.content".to_string()))
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionProvider for OllamaClient {
    fn generate(&self, diff: &str, config: &RunConfig) -> Result<String, ProviderError> {
        let prompts = commit_message_prompt(diff);
        Ok(self.chat(&prompts.system, &prompts.user, config)?)
    }
}

fn read_success_body(resp: reqwest::blocking::Response, url: &str) -> Result<String, OllamaError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(OllamaError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }

    resp.text().map_err(|source| OllamaError::Connection {
        url: url.to_string(),
        source,
    })
}
