//! Rule import / inspection tool.
//!
//! Moves validation rules between JSON files and a rule store, and prints
//! the resolved rule list for a type.

pub mod config;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use rulebook_core::error::CoreError;
use rulebook_core::validation::rules::{ValidateRule, ValidationRule};
use rulebook_core::validation::source::{ResolvedRule, ValidationSource, ValidationSourceWriter};
use serde_json::{json, Value};

use crate::config::SyncConfig;

/// Errors raised by the sync tool's commands.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid rules file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Import and inspect externally stored validation rules.
#[derive(Parser, Debug)]
#[command(name = "rulebook-sync", version, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: SyncConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Save every rule in a JSON file as one batch.
    Import {
        /// JSON array of rules.
        path: PathBuf,
    },
    /// Print the resolved rules for a type.
    Show {
        /// Type name the rules are stored under.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        type_name: String,
    },
}

/// Read a JSON array of rules.
pub fn load_rules_file(path: &Path) -> Result<Vec<ValidationRule>, SyncError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SyncError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SyncError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// JSON view of a resolved rule, as printed by `show`.
pub fn render_rule(resolved: &ResolvedRule) -> Value {
    let rule = &resolved.rule;
    json!({
        "field": resolved.field,
        "validator": rule.validator(),
        "condition": rule.condition(),
        "error_code": rule.error_code(),
        "message": rule.message(),
        "status_code": rule.status_code(),
    })
}

/// Run `command` against `store`, writing any report to `out`.
pub async fn execute<S, W>(command: &Command, store: &S, out: &mut W) -> Result<(), SyncError>
where
    S: ValidationSource + ValidationSourceWriter + ?Sized,
    W: Write,
{
    match command {
        Command::Import { path } => {
            let rules = load_rules_file(path)?;
            let count = rules.len();
            store.save_validation_rules(rules).await?;
            tracing::info!(count, path = %path.display(), "Imported validation rules");
            writeln!(out, "imported {count} rule(s) from {}", path.display())?;
        }
        Command::Show { type_name } => {
            let rules = store.get_validation_rules(type_name).await?;
            let rendered: Vec<Value> = rules.iter().map(render_rule).collect();
            let text = serde_json::to_string_pretty(&rendered)
                .map_err(|e| SyncError::Output(e.into()))?;
            writeln!(out, "{text}")?;
        }
    }
    Ok(())
}
