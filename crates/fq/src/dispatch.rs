//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands split by whether they need a resolved [`Schema`]: query commands
//! parse user input against one, the rest only touch configuration.

use std::path::PathBuf;

use filter_syntax_rs::Schema;

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::config::Config;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for commands that run without a schema.
pub trait NoSchemaCommand {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()>;
}

/// Trait for commands that parse a query.
pub trait QueryCommand {
    /// Execute the command against the resolved schema.
    fn execute(&self, ctx: &CommandContext, schema: Schema, config: &Config) -> Result<()>;
}

/// Commands that don't need a schema.
pub enum NoSchemaDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> NoSchemaDispatch<'a> {
    /// Try to create a no-schema dispatch from the CLI command.
    /// Returns None if the command parses a query.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl NoSchemaCommand for NoSchemaDispatch<'_> {
    fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()> {
        match self {
            Self::Config(Some(ConfigCommands::Show) | None) => {
                commands::config::execute_show(ctx, config)
            }
            Self::Config(Some(ConfigCommands::Path)) => commands::config::execute_path(ctx),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("fq - filter JSON records with schema-directed queries");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Commands that parse a query.
pub enum QueryDispatch<'a> {
    Filter {
        query: &'a str,
        input: &'a Option<PathBuf>,
        count: bool,
    },
    Parse {
        query: &'a str,
    },
    Tokens {
        query: &'a str,
    },
    Check {
        query: &'a str,
    },
}

impl<'a> QueryDispatch<'a> {
    /// Create a query dispatch from the CLI command.
    /// Returns None for commands handled by [`NoSchemaDispatch`].
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Filter {
                query,
                input,
                count,
            }) => Some(Self::Filter {
                query,
                input,
                count: *count,
            }),
            Some(Commands::Parse { query }) => Some(Self::Parse { query }),
            Some(Commands::Tokens { query }) => Some(Self::Tokens { query }),
            Some(Commands::Check { query }) => Some(Self::Check { query }),
            Some(Commands::Config { .. }) | Some(Commands::Completions { .. }) | None => None,
        }
    }
}

impl QueryCommand for QueryDispatch<'_> {
    fn execute(&self, ctx: &CommandContext, schema: Schema, config: &Config) -> Result<()> {
        match self {
            Self::Filter {
                query,
                input,
                count,
            } => {
                let opts = commands::filter::FilterOptions {
                    query: query.to_string(),
                    input: (*input).clone(),
                    count: *count,
                };
                commands::filter::execute(ctx, &opts, schema, config.field_getter())
            }
            Self::Parse { query } => commands::parse::execute(ctx, query, &schema),
            Self::Tokens { query } => commands::tokens::execute(ctx, query, &schema),
            Self::Check { query } => commands::check::execute(ctx, query, &schema),
        }
    }
}
