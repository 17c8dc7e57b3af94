//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the fq CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// fq - Filter JSON records with schema-directed queries
#[derive(Parser, Debug)]
#[command(name = "fq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Schema file, TOML or JSON (default: [schema] from the config file)
    #[arg(long, global = true, env = "FQ_SCHEMA")]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the records that match a query
    #[command(alias = "f")]
    Filter {
        /// Filter query (e.g., "subject:in MATH, CPSC AND number < 300")
        query: String,

        /// Read records from a file instead of stdin (JSON array or JSON Lines)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print only the number of matching records
        #[arg(short, long)]
        count: bool,
    },

    /// Print the parsed expression tree as JSON
    #[command(alias = "p")]
    Parse {
        /// Filter query
        query: String,
    },

    /// Show how each token of a query is interpreted
    #[command(alias = "t")]
    Tokens {
        /// Filter query
        query: String,
    },

    /// Check a query for syntax errors and unknown fields
    Check {
        /// Filter query
        query: String,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,
}
