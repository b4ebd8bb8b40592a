//! Library interface for the `plugver` binaries.
//!
//! Both tools are thin: they parse arguments, set up a [`session::Session`]
//! (working directory, configuration, logging), and hand off to
//! `plugver_core`. The parsers live here so `xtask` can render man pages and
//! completions for them.
//!
//! # Structure
//!
//! - [`ReleaseCli`] - `plugver-release <major|minor|patch>`
//! - [`ValidateCli`] - `plugver-validate`
//! - [`GlobalArgs`] - Flags shared by both tools
//! - [`commands`] - Command implementations

pub mod commands;

pub mod observability;

pub mod session;

use clap::{Args, CommandFactory, Parser};
use plugver_core::BumpLevel;
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG            Log filter (e.g., debug, plugver_core=trace)
    PLUGVER_LOG_PATH    Explicit log file path
    PLUGVER_LOG_DIR     Log directory
";

/// Flags accepted by every plugver tool.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long)]
    pub json: bool,
}

/// Bump the version in the package and plugin manifests and stub a changelog entry.
#[derive(Parser, Debug)]
#[command(name = "plugver-release")]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct ReleaseCli {
    /// Which version component to bump
    #[arg(value_enum, value_name = "KIND")]
    pub kind: BumpLevel,

    /// Show the computed version and affected files without writing
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Check the plugin manifest against its schema.
#[derive(Parser, Debug)]
#[command(name = "plugver-validate")]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct ValidateCli {
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Parse arguments, exiting with status 1 on a usage error.
///
/// `--help` and `--version` still exit 0.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    }
}

/// Returns the clap command for `plugver-release`, for documentation generation.
pub fn release_command() -> clap::Command {
    ReleaseCli::command()
}

/// Returns the clap command for `plugver-validate`, for documentation generation.
pub fn validate_command() -> clap::Command {
    ValidateCli::command()
}
