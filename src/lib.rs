//! Drafts a git commit message from the staged diff with a local or hosted
//! language model, then commits it once the user accepts.

pub mod app;
pub mod cli_args;
pub mod config;
pub mod error;
pub mod git;
pub mod interaction;
pub mod llm;
pub mod logging;
pub mod preferences;
pub mod setup;
pub mod ui;
