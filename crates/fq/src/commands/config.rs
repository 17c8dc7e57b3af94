//! Config command implementation.
//!
//! View configuration settings and resolve the query schema.
//! Config file is located at ~/.config/fq/config.toml.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use filter_syntax_rs::{FieldCategory, JsonFieldGetter, Schema, SchemaDefinition};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Example config file contents.
const DEFAULT_CONFIG: &str = r#"# fq - filter query configuration

# Config schema version (do not modify)
version = 1

# Field that free text and *:contains search (default: all text in the record)
# wildcard_field = "description"

# Field names per operator category
[schema]
# boolean = ["fysem", "grad"]
# set = ["professors"]
# categorical = ["subject"]
# numeric = ["number"]
# text = ["description"]

# Output preferences
[output]
# color = true              # Enable colors (respects NO_COLOR env)
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Field read by the wildcard target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wildcard_field: Option<String>,

    /// Field names per operator category.
    #[serde(default, skip_serializing_if = "Schema::is_empty")]
    pub schema: Schema,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            wildcard_field: None,
            schema: Schema::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Returns the JSON field getter configured by `wildcard_field`.
    pub fn field_getter(&self) -> JsonFieldGetter {
        match &self.wildcard_field {
            Some(field) => JsonFieldGetter::new().with_wildcard_field(field),
            None => JsonFieldGetter::new(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/fq/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    // Check for override env var first
    if let Ok(path) = env::var("FQ_CONFIG") {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            return Ok(parent.to_path_buf());
        }
    }

    // Use XDG_CONFIG_HOME if set, otherwise ~/.config/fq
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("fq"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("fq"))
        .ok_or_else(|| {
            CommandError::Config("Could not determine config directory".to_string())
        })
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    // Check for override env var first
    if let Ok(path) = env::var("FQ_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    check_version(config)
}

/// Rejects config files written for a newer fq; older files load as the current version.
fn check_version(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "config version {} is newer than the supported version {}",
            config.version, CONFIG_VERSION
        )));
    }
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Loads a schema file. Files ending in `.json` are read as JSON, anything else as TOML.
pub fn load_schema_file(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path).map_err(|e| {
        CommandError::Config(format!("Failed to read schema {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed: std::result::Result<SchemaDefinition, String> = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        toml::from_str(&content).map_err(|e| e.to_string())
    };

    let definition = parsed.map_err(|e| {
        CommandError::Config(format!("Failed to parse schema {}: {}", path.display(), e))
    })?;
    Ok(Schema::try_from(definition)?)
}

/// Returns the schema from `--schema` if given, otherwise the config's `[schema]` table.
pub fn resolve_schema(schema_path: Option<&Path>, config: &Config) -> Result<Schema> {
    match schema_path {
        Some(path) => {
            debug!(path = %path.display(), "loading schema file");
            load_schema_file(path)
        }
        None => Ok(config.schema.clone()),
    }
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext, config: &Config) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("Settings:");
            if let Some(ref field) = config.wildcard_field {
                println!("  wildcard_field: {}", field);
            }

            println!("\n[schema]");
            for category in FieldCategory::ALL {
                let fields = config.schema.fields(category);
                if !fields.is_empty() {
                    let names: Vec<&str> = fields.iter().map(String::as_str).collect();
                    println!("  {}: {}", category, names.join(", "));
                }
            }

            println!("\n[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }
        } else {
            println!("(No config file exists. Example contents:)\n");
            print!("{}", DEFAULT_CONFIG);
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}
