//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use radval_core::models::config::{Backend, RadvalConfig};
use radval_core::Comparator;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration (file plus environment overrides)
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value by dotted key (e.g. "validation.size_tolerance_mm")
    Get { key: String },

    /// Set one value by dotted key; VALUE is parsed as JSON, else taken as a string
    Set { key: String, value: String },

    /// Show the configuration file path
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(config_path),
        ConfigCommand::Init { force } => init_config(&path, force),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

/// `<config dir>/radval/config.json`, or `./radval/config.json` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("radval")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<RadvalConfig> {
    if path.exists() {
        Ok(RadvalConfig::from_file(path)?)
    } else {
        Ok(RadvalConfig::default())
    }
}

fn show_config(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    RadvalConfig::default().save(path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_or_default(path)?)?;

    let value = key
        .split('.')
        .try_fold(&json, |node, part| node.get(part))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_config(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let value: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let config = with_value(load_or_default(path)?, key, value.clone())?;
    check(&config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );
    Ok(())
}

/// Replace the value at a dotted key. Only keys the config already knows
/// about can be set; unset optional remote keys are also accepted.
fn with_value(config: RadvalConfig, key: &str, value: Value) -> anyhow::Result<RadvalConfig> {
    const OPTIONAL_KEYS: [&str; 2] = ["remote.endpoint", "remote.timeout_secs"];

    let mut json = serde_json::to_value(&config)?;
    let (parent_key, leaf) = key.rsplit_once('.').unwrap_or(("", key));

    let parent = if parent_key.is_empty() {
        Some(&mut json)
    } else {
        parent_key
            .split('.')
            .try_fold(&mut json, |node, part| node.get_mut(part))
    };
    let object = parent
        .and_then(Value::as_object_mut)
        .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;

    if !object.contains_key(leaf) && !OPTIONAL_KEYS.contains(&key) {
        anyhow::bail!("Configuration key not found: {}", key);
    }
    object.insert(leaf.to_string(), value);

    serde_json::from_value(json).map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

/// Reject settings that would only fail later, at validation time.
fn check(config: &RadvalConfig) -> anyhow::Result<()> {
    Comparator::new(config.validation.size_tolerance_mm)?;
    if config.extraction.backend == Backend::Bedrock {
        config.remote.validate()?;
    }
    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'radval config init' to create a configuration file.");
    }
    Ok(())
}
