use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::{OpenAiError, ProviderError};

use super::{clean_response, commit_message_prompt, http_client, truncate, CompletionProvider};

const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Minimal request/response structs for the OpenAI Responses API.
#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    max_output_tokens: u32,
    store: bool,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    usage: Option<ResponsesUsage>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponsesUsage {
    input_tokens: u32,
    output_tokens: u32,
    total_tokens: u32,
}

impl ResponsesResponse {
    /// `output_text` when present, else the first text part in `output`.
    ///
    /// Reasoning models put a content-less reasoning item ahead of the
    /// message, so `output[0]` is not always the one holding text.
    fn into_text(self) -> Option<String> {
        if let Some(text) = self.output_text.filter(|t| !t.trim().is_empty()) {
            return Some(text);
        }

        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .find_map(|part| part.text)
    }
}

/// OpenAI-based implementation of CompletionProvider.
pub struct OpenAiClient {
    client: Client,
}

impl OpenAiClient {
    pub fn new() -> Self {
        OpenAiClient {
            client: http_client(),
        }
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionProvider for OpenAiClient {
    fn generate(&self, diff: &str, config: &RunConfig) -> Result<String, ProviderError> {
        let prompts = commit_message_prompt(diff);
        let req = ResponsesRequest {
            model: &config.model,
            instructions: &prompts.system,
            input: &prompts.user,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            store: false,
        };

        if config.debug {
            log::debug!("Calling OpenAI model {:?} at {}", config.model, config.endpoint);
            log::debug!("OpenAI input:\n{}", truncate(&prompts.user, 3000));
        }

        let resp = self
            .client
            .post(&config.endpoint)
            .bearer_auth(config.api_key.as_deref().unwrap_or_default())
            .json(&req)
            .send()
            .map_err(OpenAiError::Connection)?;

        let status = resp.status();
        let text = resp.text().map_err(OpenAiError::Connection)?;

        if config.debug {
            log::debug!("OpenAI raw response: {}", truncate(&text, 3000));
        }

        if !status.is_success() {
            return Err(OpenAiError::Status {
                status: status.as_u16(),
                body: text.trim().to_string(),
            }
            .into());
        }

        let parsed: ResponsesResponse = serde_json::from_str(&text)
            .map_err(|e| OpenAiError::MalformedResponse(format!("invalid JSON: {e}")))?;

        if let Some(usage) = &parsed.usage {
            log::debug!(
                "Token usage: input={}, output={}, total={}",
                usage.input_tokens,
                usage.output_tokens,
                usage.total_tokens
            );
        }

        let content = parsed.into_text().ok_or_else(|| {
            OpenAiError::MalformedResponse("missing output_text and output[0].content[0].text".to_string())
        })?;

        Ok(clean_response(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Target;
    use mockito::Matcher;
    use serde_json::json;

    fn config(endpoint: String) -> RunConfig {
        RunConfig {
            target: Target::OpenAi,
            endpoint,
            model: "gpt-5-mini".into(),
            api_key: Some("sk-openai".into()),
            debug: false,
        }
    }

    #[test]
    fn generate_prefers_output_text() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/responses")
            .match_header("authorization", "Bearer sk-openai")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-5-mini",
                "max_output_tokens": MAX_OUTPUT_TOKENS,
                "store": false,
            })))
            .with_status(200)
            .with_body(r#"{"output_text":"chore: bump deps","output":[]}"#)
            .create();

        let cfg = config(format!("{}/v1/responses", server.url()));
        let msg = OpenAiClient::new().generate("diff", &cfg).expect("generate");

        assert_eq!(msg, "chore: bump deps");
        mock.assert();
    }

    #[test]
    fn generate_falls_back_to_output_content() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/responses")
            .with_status(200)
            .with_body(
                r#"{"output":[{"type":"reasoning","summary":[]},{"type":"message","content":[{"type":"output_text","text":"fix: handle empty diff"}]}]}"#,
            )
            .create();

        let cfg = config(format!("{}/v1/responses", server.url()));
        let msg = OpenAiClient::new().generate("diff", &cfg).expect("generate");

        assert_eq!(msg, "fix: handle empty diff");
    }

    #[test]
    fn missing_text_is_malformed() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/responses")
            .with_status(200)
            .with_body(r#"{"output":[]}"#)
            .create();

        let cfg = config(format!("{}/v1/responses", server.url()));
        let err = OpenAiClient::new().generate("diff", &cfg).unwrap_err();

        assert!(matches!(
            err,
            ProviderError::OpenAi(OpenAiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn http_error_is_reported_with_status() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/responses")
            .with_status(429)
            .with_body("rate limited")
            .create();

        let cfg = config(format!("{}/v1/responses", server.url()));
        let err = OpenAiClient::new().generate("diff", &cfg).unwrap_err();

        assert_eq!(err.to_string(), "OpenAI API error: HTTP 429 - rate limited");
    }
}
