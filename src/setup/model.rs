use anyhow::Result;

use crate::config::{OllamaMode, Target, DEFAULT_CLOUD_MODEL};
use crate::error::ConfigError;
use crate::llm::ModelInventory;
use crate::preferences::Preferences;
use crate::ui::{choose, MenuItem, TerminalUi};

use super::{ProviderSource, ResolveOptions, ResolvedChoice};

/// Curated Anthropic models, first is the default.
pub const ANTHROPIC_MODELS: &[(&str, &str)] = &[
    ("claude-sonnet-4-5", "balanced, recommended"),
    ("claude-haiku-4-5", "fastest and cheapest"),
    ("claude-opus-4-1", "most capable"),
];

/// Curated OpenAI models, first is the default.
pub const OPENAI_MODELS: &[(&str, &str)] = &[
    ("gpt-5-mini", "balanced, recommended"),
    ("gpt-5-nano", "fastest and cheapest"),
    ("gpt-5", "most capable"),
    ("gpt-4.1-mini", "no reasoning, low latency"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum ModelPick {
    Named(String),
    Custom,
}

/// Everything model resolution looks at besides the UI.
pub struct ModelContext<'a> {
    pub target: Target,
    pub provider_source: ProviderSource,
    pub endpoint: &'a str,
    pub opts: &'a ResolveOptions,
    pub saved: &'a Preferences,
}

/// Pick the model for the resolved provider.
pub fn resolve_model(
    ctx: &ModelContext<'_>,
    ui: &mut dyn TerminalUi,
    inventory: &dyn ModelInventory,
) -> Result<ResolvedChoice<String>> {
    if let Some(model) = ctx.opts.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        log::debug!("Model {model} selected by flag");
        return Ok(ResolvedChoice::silent(model.to_string()));
    }

    match ctx.target {
        Target::Anthropic => resolve_hosted_model(ctx, ANTHROPIC_MODELS, ui),
        Target::OpenAi => resolve_hosted_model(ctx, OPENAI_MODELS, ui),
        Target::Ollama(OllamaMode::Cloud) => resolve_cloud_model(ctx, ui),
        Target::Ollama(OllamaMode::Local) => resolve_local_model(ctx, ui, inventory),
    }
}

/// Saved model, if it was saved for this exact target and setup is not
/// being re-run.
fn saved_model_for<'a>(ctx: &ModelContext<'a>) -> Option<&'a str> {
    if ctx.opts.rerun_setup {
        return None;
    }

    if ctx.saved.target() != Some(ctx.target) {
        return None;
    }

    ctx.saved
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
}

fn resolve_hosted_model(
    ctx: &ModelContext<'_>,
    curated: &[(&str, &str)],
    ui: &mut dyn TerminalUi,
) -> Result<ResolvedChoice<String>> {
    if let Some(model) = saved_model_for(ctx) {
        log::debug!("Model {model} loaded from saved settings");
        return Ok(ResolvedChoice::silent(model.to_string()));
    }

    let mut items: Vec<MenuItem<ModelPick>> = curated
        .iter()
        .map(|(name, hint)| MenuItem::new(*name, ModelPick::Named(name.to_string())).with_hint(*hint))
        .collect();
    items.push(MenuItem::new("Custom model name…", ModelPick::Custom).with_hint("type any model id"));

    let message = format!("Which {} model?", ctx.target.label());
    match choose(ui, &message, &items)? {
        ModelPick::Named(name) => Ok(ResolvedChoice::from_prompt(name, ui)),
        ModelPick::Custom => {
            let entered = ui.input("Model name", None)?;
            let entered = entered.trim();
            if entered.is_empty() {
                return Err(ConfigError::EmptyModel.into());
            }
            Ok(ResolvedChoice::from_prompt(entered.to_string(), ui))
        }
    }
}

fn resolve_cloud_model(ctx: &ModelContext<'_>, ui: &mut dyn TerminalUi) -> Result<ResolvedChoice<String>> {
    if let Some(model) = saved_model_for(ctx) {
        log::debug!("Cloud model {model} loaded from saved settings");
        return Ok(ResolvedChoice::silent(model.to_string()));
    }

    let entered = ui.input("Which Ollama Cloud model?", Some(DEFAULT_CLOUD_MODEL))?;
    let entered = entered.trim();
    let model = if entered.is_empty() {
        DEFAULT_CLOUD_MODEL
    } else {
        entered
    };
    Ok(ResolvedChoice::from_prompt(model.to_string(), ui))
}

fn resolve_local_model(
    ctx: &ModelContext<'_>,
    ui: &mut dyn TerminalUi,
    inventory: &dyn ModelInventory,
) -> Result<ResolvedChoice<String>> {
    let installed = inventory.installed_models(ctx.endpoint)?;
    if installed.is_empty() {
        return Err(ConfigError::NoLocalModels.into());
    }
    log::debug!("Installed Ollama models: {installed:?}");

    if let Some(saved) = saved_model_for(ctx) {
        if installed.iter().any(|name| same_local_model(name, saved)) {
            log::debug!("Model {saved} loaded from saved settings");
            return Ok(ResolvedChoice::silent(saved.to_string()));
        }
        log::debug!("Saved model {saved} is no longer installed");
    }

    // A one-off `--local` run should not stop to ask.
    if ctx.provider_source == ProviderSource::Flag && !ctx.opts.rerun_setup {
        let first = installed[0].clone();
        log::debug!("Using first installed model {first}");
        return Ok(ResolvedChoice::silent(first));
    }

    let items: Vec<MenuItem<String>> = installed
        .iter()
        .map(|name| MenuItem::new(name.as_str(), name.clone()))
        .collect();
    let model = choose(ui, "Which local model?", &items)?;
    Ok(ResolvedChoice::from_prompt(model, ui))
}

/// Ollama treats `name` and `name:latest` as the same model.
fn same_local_model(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || installed.strip_suffix(":latest") == Some(wanted)
        || wanted.strip_suffix(":latest") == Some(installed)
}
