//! Terminal interaction seam.
//!
//! Everything that waits on the user goes through [`TerminalUi`] so the
//! resolution engine and the review loop can run against scripted input.

mod terminal;

pub use terminal::{action_for_key, restore_terminal, ConsoleUi};

use anyhow::Result;

/// What the user chose to do with a generated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Accept,
    Regenerate,
    Edit,
    Cancel,
}

/// One entry of a selection menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem<T> {
    pub label: String,
    pub value: T,
    pub hint: Option<String>,
}

impl<T> MenuItem<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        MenuItem {
            label: label.into(),
            value,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Label and hint of a menu entry as shown on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub hint: Option<String>,
}

/// Prompts, menus and progress display.
///
/// Any prompt may fail with [`crate::error::Cancelled`] when the user
/// presses Escape or Ctrl+C.
pub trait TerminalUi {
    /// Whether a human can answer prompts.
    ///
    /// When false, `select` returns the first option, `input` returns the
    /// default (or empty), `edit` keeps the text, `confirm` returns the
    /// default and `read_action` cancels.
    fn is_interactive(&self) -> bool;

    /// Single-select menu; returns the index of the chosen option.
    fn select(&mut self, message: &str, options: &[MenuOption]) -> Result<usize>;

    /// Free-text line entry. `default` is shown and used for empty input.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;

    /// Editable text pre-filled with `initial`.
    fn edit(&mut self, message: &str, initial: &str) -> Result<String>;

    /// Yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Block until one of the review keys is pressed.
    fn read_action(&mut self, message: &str) -> Result<KeyAction>;

    /// Show an indeterminate progress indicator.
    fn start_progress(&mut self, message: &str);

    fn stop_progress(&mut self);

    /// Print a line of output for the user.
    fn println(&mut self, text: &str);
}

/// Show `items` as a menu and return the chosen value.
pub fn choose<T: Clone>(ui: &mut dyn TerminalUi, message: &str, items: &[MenuItem<T>]) -> Result<T> {
    let options: Vec<MenuOption> = items
        .iter()
        .map(|item| MenuOption {
            label: item.label.clone(),
            hint: item.hint.clone(),
        })
        .collect();

    let index = ui.select(message, &options)?;
    let item = items
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("menu selection {index} out of range"))?;
    Ok(item.value.clone())
}
