//! In-memory stand-ins for the terminal, git, the settings file and the
//! model backends.
//!
//! Not all helpers are used by every test file.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;

use commitcraft::app::{self, Collaborators, Outcome};
use commitcraft::cli_args::Cli;
use commitcraft::config::{Environment, RunConfig};
use commitcraft::error::{Cancelled, ProviderError, VersionControlError};
use commitcraft::git::VersionControl;
use commitcraft::llm::{CompletionProvider, ModelInventory, ProviderFactory};
use commitcraft::preferences::{PreferenceStore, Preferences};
use commitcraft::ui::{KeyAction, MenuOption, TerminalUi};

/// A terminal that answers from queued replies and records what it was asked.
///
/// Running out of queued replies for a prompt panics, so an unexpected
/// prompt fails the test loudly.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    pub interactive: bool,
    pub selects: VecDeque<usize>,
    pub inputs: VecDeque<String>,
    pub edits: VecDeque<String>,
    pub confirms: VecDeque<bool>,
    pub actions: VecDeque<KeyAction>,
    /// Prompts whose message contains this text behave as if Escape was pressed.
    pub cancel_on: Option<String>,
    /// Every prompt message, in order.
    pub prompts: Vec<String>,
    /// Labels of every menu shown, in order.
    pub menus: Vec<Vec<String>>,
    pub output: Vec<String>,
    pub progress_shown: usize,
}

impl ScriptedUi {
    pub fn interactive() -> Self {
        ScriptedUi {
            interactive: true,
            ..Default::default()
        }
    }

    pub fn headless() -> Self {
        ScriptedUi::default()
    }

    pub fn choosing(mut self, index: usize) -> Self {
        self.selects.push_back(index);
        self
    }

    pub fn typing(mut self, text: &str) -> Self {
        self.inputs.push_back(text.to_string());
        self
    }

    pub fn editing_to(mut self, text: &str) -> Self {
        self.edits.push_back(text.to_string());
        self
    }

    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn pressing(mut self, action: KeyAction) -> Self {
        self.actions.push_back(action);
        self
    }

    pub fn cancel_on(mut self, message: &str) -> Self {
        self.cancel_on = Some(message.to_string());
        self
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    fn ask(&mut self, message: &str) -> Result<()> {
        self.prompts.push(message.to_string());
        match &self.cancel_on {
            Some(needle) if message.contains(needle.as_str()) => Err(Cancelled.into()),
            _ => Ok(()),
        }
    }
}

impl TerminalUi for ScriptedUi {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn select(&mut self, message: &str, options: &[MenuOption]) -> Result<usize> {
        self.menus
            .push(options.iter().map(|o| o.label.clone()).collect());
        self.ask(message)?;
        if !self.interactive {
            return Ok(0);
        }
        Ok(self
            .selects
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected menu: {message}")))
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        self.ask(message)?;
        if !self.interactive {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(self
            .inputs
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected input prompt: {message}")))
    }

    fn edit(&mut self, message: &str, initial: &str) -> Result<String> {
        self.ask(message)?;
        if !self.interactive {
            return Ok(initial.to_string());
        }
        Ok(self
            .edits
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected edit prompt: {message}")))
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        self.ask(message)?;
        if !self.interactive {
            return Ok(default);
        }
        Ok(self
            .confirms
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected confirmation: {message}")))
    }

    fn read_action(&mut self, message: &str) -> Result<KeyAction> {
        self.ask(message)?;
        if !self.interactive {
            return Ok(KeyAction::Cancel);
        }
        Ok(self
            .actions
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected key prompt: {message}")))
    }

    fn start_progress(&mut self, _message: &str) {
        self.progress_shown += 1;
    }

    fn stop_progress(&mut self) {}

    fn println(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}

/// Settings kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub saved: RefCell<Option<Preferences>>,
    pub writes: Cell<usize>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn empty() -> Self {
        MemoryStore::default()
    }

    pub fn with(prefs: Preferences) -> Self {
        MemoryStore {
            saved: RefCell::new(Some(prefs)),
            ..Default::default()
        }
    }

    pub fn current(&self) -> Option<Preferences> {
        self.saved.borrow().clone()
    }
}

impl PreferenceStore for MemoryStore {
    fn read(&self) -> Preferences {
        self.saved.borrow().clone().unwrap_or_default()
    }

    fn write(&self, prefs: &Preferences) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("read-only file system");
        }
        self.writes.set(self.writes.get() + 1);
        *self.saved.borrow_mut() = Some(prefs.clone());
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        Ok(self.saved.borrow_mut().take().is_some())
    }

    fn location(&self) -> String {
        "memory://config.json".to_string()
    }
}

/// A repository with a fixed staged diff that records commits.
#[derive(Debug)]
pub struct FakeGit {
    pub diff: String,
    pub status: i32,
    pub commits: RefCell<Vec<String>>,
}

impl FakeGit {
    pub fn staged(diff: &str) -> Self {
        FakeGit {
            diff: diff.to_string(),
            status: 0,
            commits: RefCell::new(Vec::new()),
        }
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    pub fn committed(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }
}

impl VersionControl for FakeGit {
    fn staged_diff(&self) -> Result<String, VersionControlError> {
        Ok(self.diff.clone())
    }

    fn commit(&self, message: &str) -> Result<i32, VersionControlError> {
        self.commits.borrow_mut().push(message.to_string());
        Ok(self.status)
    }
}

#[derive(Debug, Default)]
pub struct ProviderLog {
    pub responses: RefCell<VecDeque<Result<String, ProviderError>>>,
    pub requests: RefCell<Vec<(String, RunConfig)>>,
    pub inventory_calls: Cell<usize>,
}

/// Model backends answering from queued responses.
#[derive(Debug, Default, Clone)]
pub struct FakeProviders {
    pub installed: Vec<String>,
    pub log: Rc<ProviderLog>,
}

impl FakeProviders {
    pub fn new() -> Self {
        FakeProviders::default()
    }

    pub fn installed(mut self, models: &[&str]) -> Self {
        self.installed = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn respond(self, message: &str) -> Self {
        self.log
            .responses
            .borrow_mut()
            .push_back(Ok(message.to_string()));
        self
    }

    pub fn fail(self, err: ProviderError) -> Self {
        self.log.responses.borrow_mut().push_back(Err(err));
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.log.requests.borrow().len()
    }

    pub fn inventory_calls(&self) -> usize {
        self.log.inventory_calls.get()
    }
}

struct FakeClient {
    log: Rc<ProviderLog>,
}

impl CompletionProvider for FakeClient {
    fn generate(&self, diff: &str, config: &RunConfig) -> Result<String, ProviderError> {
        self.log
            .requests
            .borrow_mut()
            .push((diff.to_string(), config.clone()));
        self.log
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("no queued response for {}", config.model))
    }
}

impl ProviderFactory for FakeProviders {
    fn client_for(&self, _config: &RunConfig) -> Box<dyn CompletionProvider> {
        Box::new(FakeClient {
            log: Rc::clone(&self.log),
        })
    }
}

impl ModelInventory for FakeProviders {
    fn installed_models(&self, _chat_endpoint: &str) -> Result<Vec<String>, ProviderError> {
        self.log.inventory_calls.set(self.log.inventory_calls.get() + 1);
        Ok(self.installed.clone())
    }
}

pub const SAMPLE_DIFF: &str = "diff --git a/src/auth.rs b/src/auth.rs\n\
+pub fn login(user: &str) -> bool {\n\
+    !user.is_empty()\n\
+}\n";

/// Run the whole tool against fakes.
pub fn run_app(
    cli: &Cli,
    env: &Environment,
    store: &MemoryStore,
    ui: &mut ScriptedUi,
    git: &FakeGit,
    providers: &FakeProviders,
) -> Result<Outcome> {
    app::run(
        cli,
        env,
        Collaborators {
            store,
            ui,
            vcs: git,
            inventory: providers,
            providers,
        },
    )
}
