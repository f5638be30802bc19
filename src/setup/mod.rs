//! Turns flags, environment, saved settings and live model inventory into a
//! concrete [`RunConfig`].
//!
//! Steps run in a fixed order: provider, then credential, then model. Each
//! step reports whether the user was asked, which decides whether the
//! result is remembered for the next run.

mod credentials;
mod model;
mod provider;

pub use credentials::{
    key_source_for, resolve_api_key, ApiKeySource, ANTHROPIC_KEY, OLLAMA_CLOUD_KEY, OPENAI_KEY,
};
pub use model::{resolve_model, ModelContext, ANTHROPIC_MODELS, OPENAI_MODELS};
pub use provider::{
    provider_menu, resolve_provider, target_from_env, ProviderSource, ResolvedProvider,
};

use anyhow::Result;

use crate::cli_args::Cli;
use crate::config::{endpoint_for, Environment, RunConfig, Target};
use crate::llm::ModelInventory;
use crate::preferences::Preferences;
use crate::ui::TerminalUi;

/// A resolved value and whether the user was prompted for it this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChoice<T> {
    pub value: T,
    pub from_interactive: bool,
}

impl<T> ResolvedChoice<T> {
    /// Decided from flags, environment or saved settings.
    pub fn silent(value: T) -> Self {
        ResolvedChoice {
            value,
            from_interactive: false,
        }
    }

    /// Entered or picked by the user.
    pub fn prompted(value: T) -> Self {
        ResolvedChoice {
            value,
            from_interactive: true,
        }
    }

    /// Came back from a prompt, which only counts as the user's choice when
    /// a terminal was there to answer it.
    pub fn from_prompt(value: T, ui: &dyn TerminalUi) -> Self {
        ResolvedChoice {
            value,
            from_interactive: ui.is_interactive(),
        }
    }
}

/// The command-line inputs resolution cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub target: Option<Target>,
    pub model: Option<String>,
    pub rerun_setup: bool,
}

impl From<&Cli> for ResolveOptions {
    fn from(cli: &Cli) -> Self {
        ResolveOptions {
            target: cli.target(),
            model: cli.model.clone(),
            rerun_setup: cli.setup,
        }
    }
}

/// Result of resolving a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub config: RunConfig,
    /// Whether the configuration should be written back to the store.
    pub persist: bool,
    /// Key to remember. Differs from `config.api_key` when the run used an
    /// environment key: that one is never written, the saved key is kept.
    pub stored_key: Option<String>,
}

impl Resolution {
    /// What to store for this run.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            api_key: self.stored_key.clone(),
            ..Preferences::from_run_config(&self.config)
        }
    }
}

/// Remember a run when anything in it came from the user: a picked
/// provider, a picked model or a freshly entered key.
pub fn should_persist(provider_prompted: bool, model_prompted: bool, key_entered: bool) -> bool {
    provider_prompted || model_prompted || key_entered
}

/// Resolve provider, credential and model, in that order.
pub fn resolve_run_config(
    opts: &ResolveOptions,
    env: &Environment,
    saved: &Preferences,
    ui: &mut dyn TerminalUi,
    inventory: &dyn ModelInventory,
) -> Result<Resolution> {
    let provider = resolve_provider(opts, env, saved, ui)?;
    let target = provider.target;
    let endpoint = endpoint_for(target, env);

    // A saved key only counts for the provider it was saved with.
    let saved_key = if saved.target() == Some(target) {
        saved.api_key.as_deref()
    } else {
        None
    };

    let api_key = match key_source_for(target) {
        Some(source) => Some(resolve_api_key(env.api_key_for(target), saved_key, &source, ui)?),
        None => None,
    };

    let stored_key = if env.api_key_for(target).is_some() {
        saved_key.map(str::to_string)
    } else {
        api_key.as_ref().map(|key| key.value.clone())
    };

    let model = resolve_model(
        &ModelContext {
            target,
            provider_source: provider.source,
            endpoint: &endpoint,
            opts,
            saved,
        },
        ui,
        inventory,
    )?;

    let key_entered = api_key.as_ref().is_some_and(|key| key.from_interactive);
    let persist = should_persist(provider.from_interactive(), model.from_interactive, key_entered);

    log::debug!(
        "Resolved {target} at {endpoint} with model {} (persist: {persist})",
        model.value
    );

    Ok(Resolution {
        config: RunConfig {
            target,
            endpoint,
            model: model.value,
            api_key: api_key.map(|key| key.value),
            debug: env.debug,
        },
        persist,
        stored_key,
    })
}
