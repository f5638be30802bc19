use clap::{ArgAction, ArgGroup, Parser};

use crate::config::{OllamaMode, Target};

/// CLI options
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "commitcraft",
    version,
    about = "Draft a git commit message from your staged diff with Ollama, Anthropic or OpenAI",
    disable_version_flag = true
)]
#[command(group(
    ArgGroup::new("provider")
        .args(["local", "cloud", "anthropic", "openai"])
        .multiple(false)
))]
pub struct Cli {
    /// Model name to use for this run (e.g. llama3.2, claude-sonnet-4-5)
    #[arg(short = 'm', long, value_name = "NAME")]
    pub model: Option<String>,

    /// Use a local Ollama server (OLLAMA_HOST, default 127.0.0.1:11434)
    #[arg(long)]
    pub local: bool,

    /// Use Ollama Cloud (needs OLLAMA_API_KEY)
    #[arg(long)]
    pub cloud: bool,

    /// Use Anthropic (needs ANTHROPIC_API_KEY)
    #[arg(long)]
    pub anthropic: bool,

    /// Use OpenAI (needs OPENAI_API_KEY)
    #[arg(long)]
    pub openai: bool,

    /// Ignore saved settings and choose provider and model again
    #[arg(long)]
    pub setup: bool,

    /// Delete saved settings and exit
    #[arg(long)]
    pub reset: bool,

    /// Skip the confirmation when resetting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Cli {
    /// Provider chosen by flag, if any.
    pub fn target(&self) -> Option<Target> {
        if self.local {
            Some(Target::Ollama(OllamaMode::Local))
        } else if self.cloud {
            Some(Target::Ollama(OllamaMode::Cloud))
        } else if self.anthropic {
            Some(Target::Anthropic)
        } else if self.openai {
            Some(Target::OpenAi)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("commitcraft").chain(args.iter().copied()))
    }

    #[test]
    fn provider_flags_map_to_targets() {
        assert_eq!(parse(&["--local"]).unwrap().target(), Some(Target::Ollama(OllamaMode::Local)));
        assert_eq!(parse(&["--cloud"]).unwrap().target(), Some(Target::Ollama(OllamaMode::Cloud)));
        assert_eq!(parse(&["--anthropic"]).unwrap().target(), Some(Target::Anthropic));
        assert_eq!(parse(&["--openai"]).unwrap().target(), Some(Target::OpenAi));
        assert_eq!(parse(&[]).unwrap().target(), None);
    }

    #[test]
    fn model_takes_a_value() {
        let cli = parse(&["-m", "mistral", "--setup"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("mistral"));
        assert!(cli.setup);
    }

    #[test]
    fn model_rejects_flag_like_value() {
        let err = parse(&["--model", "--local"]).unwrap_err();
        assert!(err.use_stderr());

        assert!(parse(&["--model"]).is_err());
    }

    #[test]
    fn provider_flags_are_exclusive() {
        let err = parse(&["--local", "--openai"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn short_v_prints_version() {
        let err = parse(&["-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }
}
