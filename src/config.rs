use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
pub const OLLAMA_DEFAULT_PORT: u16 = 11434;
pub const OLLAMA_CHAT_PATH: &str = "/api/chat";
pub const OLLAMA_TAGS_PATH: &str = "/api/tags";
pub const OLLAMA_CLOUD_ENDPOINT: &str = "https://ollama.com/api/chat";
pub const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/responses";

/// Model used for Ollama Cloud when the user leaves the model prompt empty.
pub const DEFAULT_CLOUD_MODEL: &str = "gpt-oss:120b";

/// Provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Ollama,
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an Ollama server lives: on this machine or on ollama.com.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OllamaMode {
    Local,
    Cloud,
}

impl OllamaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OllamaMode::Local => "local",
            OllamaMode::Cloud => "cloud",
        }
    }
}

/// A provider together with its Ollama mode.
///
/// Only the Ollama family carries a mode, so the "mode iff ollama" rule is
/// enforced by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Ollama(OllamaMode),
    Anthropic,
    OpenAi,
}

impl Target {
    pub fn provider(&self) -> Provider {
        match self {
            Target::Ollama(_) => Provider::Ollama,
            Target::Anthropic => Provider::Anthropic,
            Target::OpenAi => Provider::OpenAi,
        }
    }

    pub fn ollama_mode(&self) -> Option<OllamaMode> {
        match self {
            Target::Ollama(mode) => Some(*mode),
            _ => None,
        }
    }

    /// Rebuild a target from the flat persisted form.
    ///
    /// A saved Ollama provider without a mode predates cloud support and
    /// means a local server.
    pub fn from_parts(provider: Provider, mode: Option<OllamaMode>) -> Self {
        match provider {
            Provider::Ollama => Target::Ollama(mode.unwrap_or(OllamaMode::Local)),
            Provider::Anthropic => Target::Anthropic,
            Provider::OpenAi => Target::OpenAi,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Target::Ollama(OllamaMode::Local) => "Ollama (local)",
            Target::Ollama(OllamaMode::Cloud) => "Ollama Cloud",
            Target::Anthropic => "Anthropic",
            Target::OpenAi => "OpenAI",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub target: Target,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub debug: bool,
}

impl RunConfig {
    pub fn provider(&self) -> Provider {
        self.target.provider()
    }

    pub fn ollama_mode(&self) -> Option<OllamaMode> {
        self.target.ollama_mode()
    }
}

/// Snapshot of the environment variables commitcraft reads.
///
/// Blank values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_api_key: Option<String>,
    pub ollama_host: Option<String>,
    pub debug: bool,
}

impl Environment {
    pub fn from_process() -> Self {
        Environment {
            anthropic_api_key: non_blank_var("ANTHROPIC_API_KEY"),
            openai_api_key: non_blank_var("OPENAI_API_KEY"),
            ollama_api_key: non_blank_var("OLLAMA_API_KEY"),
            ollama_host: non_blank_var("OLLAMA_HOST"),
            debug: env::var("DEBUG").map(|v| v.trim() == "1").unwrap_or(false),
        }
    }

    /// The credential this environment supplies for `target`, if any.
    pub fn api_key_for(&self, target: Target) -> Option<&str> {
        match target {
            Target::Anthropic => self.anthropic_api_key.as_deref(),
            Target::OpenAi => self.openai_api_key.as_deref(),
            Target::Ollama(OllamaMode::Cloud) => self.ollama_api_key.as_deref(),
            Target::Ollama(OllamaMode::Local) => None,
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Chat endpoint for `target`, honoring `OLLAMA_HOST` for a local server.
pub fn endpoint_for(target: Target, env: &Environment) -> String {
    match target {
        Target::Ollama(OllamaMode::Local) => ollama_local_endpoint(env.ollama_host.as_deref()),
        Target::Ollama(OllamaMode::Cloud) => OLLAMA_CLOUD_ENDPOINT.to_string(),
        Target::Anthropic => ANTHROPIC_ENDPOINT.to_string(),
        Target::OpenAi => OPENAI_ENDPOINT.to_string(),
    }
}

/// Resolve the local Ollama chat endpoint.
///
/// `OLLAMA_HOST` with a scheme is used as-is unless its path is exactly `/`,
/// in which case the chat path is appended. Without a scheme, `http://` and
/// (if missing) the default port are added first.
pub fn ollama_local_endpoint(host: Option<&str>) -> String {
    let host = host.map(str::trim).filter(|h| !h.is_empty());
    let raw = match host {
        None => DEFAULT_OLLAMA_HOST.to_string(),
        Some(h) if h.contains("://") => h.to_string(),
        Some(h) => {
            let h = bracket_bare_ipv6(h);
            if has_port(&h) {
                format!("http://{h}")
            } else {
                format!("http://{h}:{OLLAMA_DEFAULT_PORT}")
            }
        }
    };

    match Url::parse(&raw) {
        Ok(url) if url.path() == "/" => {
            format!("{}{}", raw.trim_end_matches('/'), OLLAMA_CHAT_PATH)
        }
        _ => raw,
    }
}

/// Tags (installed models) endpoint on the same origin as `chat_endpoint`.
pub fn ollama_tags_endpoint(chat_endpoint: &str) -> String {
    match Url::parse(chat_endpoint) {
        Ok(mut url) => {
            url.set_path(OLLAMA_TAGS_PATH);
            url.set_query(None);
            url.to_string()
        }
        Err(_) => format!("{}{}", DEFAULT_OLLAMA_HOST, OLLAMA_TAGS_PATH),
    }
}

/// `::1` → `[::1]`; anything else is returned unchanged.
fn bracket_bare_ipv6(host: &str) -> String {
    if !host.starts_with('[') && host.matches(':').count() >= 2 {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

fn has_port(host: &str) -> bool {
    // "[::1]:11434" or "localhost:11434"; a bare IPv6 literal has no port.
    match host.rsplit_once(':') {
        Some((before, port)) => {
            !port.is_empty()
                && port.chars().all(|c| c.is_ascii_digit())
                && (!before.contains(':') || before.ends_with(']'))
        }
        None => false,
    }
}
