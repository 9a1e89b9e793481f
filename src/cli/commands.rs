//! Command dispatch

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{ListingService, OPEN_FAILURE_LINE};
use crate::application::{ApplicationError, ApplicationResult};
use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{Settings, SourceKind};
use crate::infrastructure::di::{ServiceContainer, DEMO_PREFIX};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::List { locator, tree } => {
            let settings = resolve_settings(cli)?;
            list(settings, locator, *tree)
        }
        Commands::Config { template } => {
            if *template {
                output::info(&Settings::template());
                return Ok(());
            }
            let settings = resolve_settings(cli)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Loaded settings with command line flags applied on top.
pub fn resolve_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(format) = cli.format {
        settings.format = format;
    }
    if let Some(source) = cli.source {
        settings.source = source;
    }
    if let Some(logger) = cli.logger {
        settings.logger = logger;
    }
    debug!("effective settings: {:?}", settings);
    Ok(settings)
}

#[instrument(skip(settings))]
fn list(settings: Settings, locator: &str, tree: bool) -> CliResult<()> {
    let memory = settings.source == SourceKind::Memory;
    let container = ServiceContainer::new(settings)?;
    if memory && !container.register_demo(locator) {
        output::warning(&format!(
            "memory source only serves demo content for '{DEMO_PREFIX}' locators"
        ));
    }
    let service = container.listing_service();

    match listing_text(&service, locator, tree) {
        Ok(text) => {
            output::info(&text);
            Ok(())
        }
        Err(e @ ApplicationError::SourceUnavailable { .. }) => {
            output::info(OPEN_FAILURE_LINE);
            Err(CliError::from(e))
        }
        Err(e) => Err(CliError::from(e)),
    }
}

/// Text printed by `list`: the listing lines verbatim, or the box-drawing tree.
pub fn listing_text(
    service: &ListingService,
    locator: &str,
    tree: bool,
) -> ApplicationResult<String> {
    if tree {
        // termtree ends every row with a newline; names keep their own whitespace
        service
            .tree(locator)
            .map(|tree| tree.to_string().trim_end_matches('\n').to_string())
    } else {
        service
            .try_list(locator)
            .map(|lines| output::join_lines(&lines))
    }
}
