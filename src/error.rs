//! Error types shared by the resolution engine, the providers and the loop.

use thiserror::Error;

/// The user pressed Escape or Ctrl+C at a prompt.
///
/// Raised by the terminal UI and mapped to exit status 0 at the process
/// boundary, never to a failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Cancelled.")]
pub struct Cancelled;

/// Errors from running git.
#[derive(Error, Debug)]
pub enum VersionControlError {
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args} exited with status {code:?}: {stderr}")]
    Failed {
        args: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Errors from the Ollama chat and tags endpoints.
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("Could not reach Ollama at {url}. Is `ollama serve` running? ({source})")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Ollama returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Ollama returned an unexpected response: {0}")]
    MalformedResponse(String),
}

/// Errors from the Anthropic Messages API.
#[derive(Error, Debug)]
pub enum AnthropicError {
    #[error("Failed to reach the Anthropic API: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Anthropic API error: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Anthropic response did not contain text content: {0}")]
    MalformedResponse(String),
}

/// Errors from the OpenAI Responses API.
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("Failed to reach the OpenAI API: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("OpenAI API error: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("OpenAI response did not contain output text: {0}")]
    MalformedResponse(String),
}

/// A failure inside one of the completion providers.
///
/// Printed verbatim when it reaches `main`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Ollama(#[from] OllamaError),

    #[error(transparent)]
    Anthropic(#[from] AnthropicError),

    #[error(transparent)]
    OpenAi(#[from] OpenAiError),
}

/// Missing or unusable configuration detected while resolving a run.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{label} API key is required. Set {env_var} and try again.")]
    MissingApiKey {
        label: &'static str,
        env_var: &'static str,
    },

    #[error("API key cannot be empty.")]
    EmptyApiKey,

    #[error("No local Ollama models found. Install one first, for example: ollama pull llama3.2")]
    NoLocalModels,

    #[error("Model name cannot be empty.")]
    EmptyModel,

    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,
}

/// Whether `err` is, or wraps, a user cancellation.
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Cancelled>().is_some()
}
