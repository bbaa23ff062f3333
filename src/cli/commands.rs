use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// `negprompt` - negative prompting with constraint checks and one refinement.
#[derive(Parser, Debug)]
#[command(name = "negprompt")]
#[command(author = "theonlyhennygod")]
#[command(version)]
#[command(
    about = "Render an exclusion-style prompt, check the reply against constraints, refine once.",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.negprompt/config.toml when present)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one negative-prompt cycle against the configured provider
    Run {
        #[command(flatten)]
        prompt: PromptArgs,

        #[command(flatten)]
        constraints: ConstraintArgs,

        /// Qualifier appended to the style on refinement ("" disables)
        #[arg(long)]
        qualifier: Option<String>,

        /// Refined attempts allowed after the initial one
        #[arg(long)]
        max_refinements: Option<u32>,

        /// Reply offline with these responses, in order, instead of calling a provider
        #[arg(long = "scripted", value_name = "RESPONSE")]
        scripted: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render an instruction without generating
    Render {
        #[command(flatten)]
        prompt: PromptArgs,
    },

    /// Evaluate a given response offline
    Check {
        /// Response text to evaluate
        #[arg(long)]
        response: String,

        #[command(flatten)]
        constraints: ConstraintArgs,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },

    /// List built-in templates
    Templates,

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (API key masked)
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Subject to describe
    #[arg(long)]
    pub topic: String,

    /// Style of the description
    #[arg(long, default_value = "technical")]
    pub style: String,

    /// Word or phrase the instruction tells the model to avoid (repeatable)
    #[arg(long = "exclude", value_name = "WORD")]
    pub exclude: Vec<String>,

    /// Built-in template name
    #[arg(long, default_value = "negative_description", conflicts_with = "pattern")]
    pub template: String,

    /// Custom pattern with `{slot}` placeholders
    #[arg(long)]
    pub pattern: Option<String>,

    /// Extra slot value for custom patterns (repeatable)
    #[arg(long = "set", value_name = "SLOT=VALUE", value_parser = parse_slot_assignment)]
    pub set: Vec<(String, String)>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConstraintArgs {
    /// Forbidden word or phrase checked in the response (repeatable)
    #[arg(long = "forbid", value_name = "WORD")]
    pub forbid: Vec<String>,

    /// Maximum number of words in the response
    #[arg(long)]
    pub max_words: Option<usize>,
}

fn parse_slot_assignment(raw: &str) -> Result<(String, String), String> {
    let (slot, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=VALUE, got '{raw}'"))?;
    let slot = slot.trim();
    if slot.is_empty() {
        return Err(format!("empty slot name in '{raw}'"));
    }
    Ok((slot.to_string(), value.to_string()))
}
