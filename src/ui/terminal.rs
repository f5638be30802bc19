use anyhow::Result;
use colored::Colorize;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal,
};
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;

use super::{KeyAction, MenuOption, TerminalUi};
use crate::error::Cancelled;

const SPINNER_TICK: Duration = Duration::from_millis(80);
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Map a key press to a review action. Other keys yield `None`.
pub fn action_for_key(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_interrupt(key) {
        return Some(KeyAction::Cancel);
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Enter => Some(KeyAction::Accept),
        KeyCode::Esc => Some(KeyAction::Cancel),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Some(KeyAction::Accept),
            'r' => Some(KeyAction::Regenerate),
            'e' => Some(KeyAction::Edit),
            _ => None,
        },
        _ => None,
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Leave raw mode and show the cursor again.
///
/// Safe to call from a signal handler thread and when the terminal is
/// already in cooked mode.
pub fn restore_terminal() {
    let _ = terminal::disable_raw_mode();
    let _ = execute!(io::stderr(), Show);
    let _ = execute!(io::stdout(), Show);
}

/// A failed dialoguer prompt. Ctrl+C inside a prompt surfaces as an
/// interrupted read and becomes [`Cancelled`].
fn prompt_error(err: impl Into<io::Error>) -> anyhow::Error {
    let err: io::Error = err.into();
    if err.kind() == io::ErrorKind::Interrupted {
        restore_terminal();
        return Cancelled.into();
    }
    anyhow::Error::new(err).context("terminal prompt failed")
}

/// Raw mode held for the lifetime of the guard.
///
/// Dropping the guard restores cooked mode and the cursor, whether the
/// prompt finished, was cancelled or failed.
struct RawModeGuard;

impl RawModeGuard {
    fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Next key press, skipping releases, resizes and mouse events.
fn next_key() -> io::Result<KeyEvent> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Release {
                return Ok(key);
            }
        }
    }
}

/// Menu line for an option, hint dimmed after the label.
fn menu_line(option: &MenuOption) -> String {
    match &option.hint {
        Some(hint) => format!("{}  {}", option.label, hint.dimmed()),
        None => option.label.clone(),
    }
}

/// Prompts drawn with dialoguer, review keys read with crossterm.
pub struct ConsoleUi {
    out: Stdout,
    theme: ColorfulTheme,
    interactive: bool,
    spinner: Option<ProgressBar>,
}

impl ConsoleUi {
    /// Interactive only when both stdin and stdout are terminals.
    pub fn new() -> Self {
        ConsoleUi {
            out: io::stdout(),
            theme: ColorfulTheme::default(),
            interactive: io::stdin().is_terminal() && io::stdout().is_terminal(),
            spinner: None,
        }
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalUi for ConsoleUi {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn select(&mut self, message: &str, options: &[MenuOption]) -> Result<usize> {
        if options.is_empty() {
            anyhow::bail!("nothing to choose from for: {message}");
        }
        if !self.interactive {
            log::debug!("Non-interactive; choosing {:?} for {message:?}", options[0].label);
            return Ok(0);
        }

        let items: Vec<String> = options.iter().map(menu_line).collect();
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or_else(|| Cancelled.into())
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        if !self.interactive {
            return Ok(default.unwrap_or_default().to_string());
        }

        let mut prompt = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true);
        if let Some(default) = default {
            prompt = prompt.default(default.to_string());
        }

        let text = prompt.interact_text().map_err(prompt_error)?;
        let text = text.trim();
        match default {
            Some(default) if text.is_empty() => Ok(default.to_string()),
            _ => Ok(text.to_string()),
        }
    }

    fn edit(&mut self, message: &str, initial: &str) -> Result<String> {
        if !self.interactive {
            return Ok(initial.to_string());
        }

        // A subject line is edited in place; a message with a body goes to $EDITOR.
        if !initial.contains('\n') {
            return Input::<String>::with_theme(&self.theme)
                .with_prompt(message)
                .with_initial_text(initial)
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_error);
        }

        match Editor::new().extension(".txt").edit(initial).map_err(prompt_error)? {
            Some(text) => Ok(text),
            None => {
                log::debug!("Editor closed without saving; keeping the message");
                Ok(initial.to_string())
            }
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        if !self.interactive {
            return Ok(default);
        }

        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or_else(|| Cancelled.into())
    }

    fn read_action(&mut self, message: &str) -> Result<KeyAction> {
        if !self.interactive {
            return Ok(KeyAction::Cancel);
        }

        let _raw = RawModeGuard::acquire()?;
        queue!(
            self.out,
            Print(format!(
                "{} {}  {}  {}  {} ",
                message.bold(),
                "[a]ccept".green(),
                "[r]egenerate".yellow(),
                "[e]dit".cyan(),
                "[esc] cancel".dimmed()
            ))
        )?;
        self.out.flush()?;

        loop {
            let key = next_key()?;
            if let Some(action) = action_for_key(&key) {
                queue!(self.out, Print("\r\n"))?;
                self.out.flush()?;
                if action == KeyAction::Cancel {
                    return Err(Cancelled.into());
                }
                return Ok(action);
            }
        }
    }

    fn start_progress(&mut self, message: &str) {
        if !self.interactive {
            eprintln!("{message}");
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(SPINNER_FRAMES)
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(SPINNER_TICK);
        self.spinner = Some(spinner);
    }

    fn stop_progress(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn println(&mut self, text: &str) {
        println!("{text}");
    }
}
