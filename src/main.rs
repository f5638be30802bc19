use std::process;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use commitcraft::app::{self, error_message, Collaborators, Outcome};
use commitcraft::cli_args::Cli;
use commitcraft::config::Environment;
use commitcraft::git::GitCli;
use commitcraft::llm::HttpProviders;
use commitcraft::logging::init_logger;
use commitcraft::preferences::FileStore;
use commitcraft::ui::{restore_terminal, ConsoleUi};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let env = Environment::from_process();
    init_logger(env.debug);

    // Ctrl+C outside a prompt: leave the terminal usable and exit quietly.
    if let Err(e) = ctrlc::set_handler(|| {
        restore_terminal();
        eprintln!("\n{}", "Cancelled.".dimmed());
        process::exit(0);
    }) {
        log::warn!("Could not install the Ctrl-C handler: {e}");
    }

    let code = match run(&cli, &env) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            log::debug!("{err:?}");
            eprintln!("{}", error_message(&err).red());
            1
        }
    };
    process::exit(code);
}

fn run(cli: &Cli, env: &Environment) -> Result<Outcome> {
    let store = FileStore::at_default_location()?;
    let mut ui = ConsoleUi::new();
    let providers = HttpProviders;

    app::run(
        cli,
        env,
        Collaborators {
            store: &store,
            ui: &mut ui,
            vcs: &GitCli,
            inventory: &providers,
            providers: &providers,
        },
    )
}
