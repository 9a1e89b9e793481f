//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::{LoggerKind, ModelFormat, SourceKind};

/// List the assembly/part hierarchy of CAD models
#[derive(Parser, Debug)]
#[command(name = "cadtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (applied over the global config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Input format
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<ModelFormat>,

    /// Locator resolution
    #[arg(short, long, global = true, value_enum)]
    pub source: Option<SourceKind>,

    /// Listing log events
    #[arg(long, global = true, value_enum)]
    pub logger: Option<LoggerKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List assemblies and parts behind a locator
    List {
        /// File path, or `mem:<name>` with `--source memory`
        #[arg(value_hint = ValueHint::FilePath)]
        locator: String,

        /// Draw the hierarchy as a tree
        #[arg(short, long)]
        tree: bool,
    },

    /// Show effective settings
    Config {
        /// Print a commented template instead
        #[arg(long)]
        template: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
