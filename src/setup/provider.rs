use anyhow::Result;

use crate::config::{Environment, OllamaMode, Target};
use crate::preferences::Preferences;
use crate::ui::{choose, MenuItem, TerminalUi};

use super::ResolveOptions;

/// Where the provider for this run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSource {
    Flag,
    Environment,
    Saved,
    Prompt,
    /// No terminal to ask on: the first menu entry was taken.
    Default,
}

/// Outcome of provider resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub target: Target,
    pub source: ProviderSource,
}

impl ResolvedProvider {
    pub fn from_interactive(&self) -> bool {
        self.source == ProviderSource::Prompt
    }
}

/// Menu shown when nothing else decides the provider.
pub fn provider_menu() -> Vec<MenuItem<Target>> {
    vec![
        MenuItem::new("Local", Target::Ollama(OllamaMode::Local))
            .with_hint("Ollama running on this machine, free and private"),
        MenuItem::new("Cloud", Target::Ollama(OllamaMode::Cloud))
            .with_hint("Ollama Cloud models, needs OLLAMA_API_KEY"),
        MenuItem::new("Anthropic", Target::Anthropic)
            .with_hint("Claude models, needs ANTHROPIC_API_KEY"),
        MenuItem::new("OpenAI", Target::OpenAi).with_hint("GPT models, needs OPENAI_API_KEY"),
    ]
}

/// The provider implied by a credential in the environment.
///
/// Checked in a fixed order: Anthropic, OpenAI, Ollama Cloud.
pub fn target_from_env(env: &Environment) -> Option<Target> {
    if env.anthropic_api_key.is_some() {
        Some(Target::Anthropic)
    } else if env.openai_api_key.is_some() {
        Some(Target::OpenAi)
    } else if env.ollama_api_key.is_some() {
        Some(Target::Ollama(OllamaMode::Cloud))
    } else {
        None
    }
}

/// Decide the provider: CLI flag, then environment credential, then saved
/// settings (unless setup is re-run), then ask.
pub fn resolve_provider(
    opts: &ResolveOptions,
    env: &Environment,
    saved: &Preferences,
    ui: &mut dyn TerminalUi,
) -> Result<ResolvedProvider> {
    if let Some(target) = opts.target {
        log::debug!("Provider {target} selected by flag");
        return Ok(ResolvedProvider {
            target,
            source: ProviderSource::Flag,
        });
    }

    if let Some(target) = target_from_env(env) {
        log::debug!("Provider {target} selected by environment credential");
        return Ok(ResolvedProvider {
            target,
            source: ProviderSource::Environment,
        });
    }

    if !opts.rerun_setup {
        if let Some(provider) = saved.provider {
            let target = Target::from_parts(provider, saved.ollama_mode);
            log::debug!("Provider {target} loaded from saved settings");
            return Ok(ResolvedProvider {
                target,
                source: ProviderSource::Saved,
            });
        }
    }

    let target = choose(ui, "Which model provider do you want to use?", &provider_menu())?;
    let source = if ui.is_interactive() {
        ProviderSource::Prompt
    } else {
        ProviderSource::Default
    };
    Ok(ResolvedProvider { target, source })
}
