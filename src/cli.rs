//! CLI argument parsing
//!
//! This module provides the command-line interface for the afinar recipe
//! toolkit.
//!
//! # Usage
//!
//! ```bash
//! afinar validate llama3_lora_sft.yaml
//! afinar validate recipes/*.yaml --detailed
//! afinar show llama3_lora_sft.yaml --format json
//! afinar init recipe.yaml --template qlora_sft --model Qwen/Qwen2-7B
//! ```

use crate::recipe::Template;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Afinar: Fine-Tuning Recipe Toolkit
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "afinar")]
#[command(author = "PAIML")]
#[command(version)]
#[command(about = "Schema validation and generation for declarative YAML fine-tuning recipes")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Validate one or more recipe files without training
    Validate(ValidateArgs),

    /// Display a recipe in text, JSON, or YAML form
    Show(ShowArgs),

    /// Write a starter recipe from a template
    Init(InitArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Paths to YAML recipe files
    #[arg(value_name = "CONFIG", num_args = 1.., required = true)]
    pub configs: Vec<PathBuf>,

    /// Show a per-group summary of each valid recipe
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the show command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ShowArgs {
    /// Path to a YAML recipe file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the init command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InitArgs {
    /// Destination path for the generated recipe
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Recipe template (lora_sft, qlora_sft, full_sft, predict)
    #[arg(short, long, default_value = "lora_sft")]
    pub template: InitTemplate,

    /// Model identifier to place in the recipe
    #[arg(short, long)]
    pub model: Option<String>,

    /// Dataset identifier to place in the recipe
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Overwrite the destination if it exists
    #[arg(short, long)]
    pub force: bool,
}

/// Output format for the show command
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Unknown output format: {}. Valid formats: text, json, yaml",
                s
            )),
        }
    }
}

/// Recipe template selector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InitTemplate {
    #[default]
    LoraSft,
    QloraSft,
    FullSft,
    Predict,
}

impl InitTemplate {
    /// Map to the recipe-level template type
    pub fn to_template(self) -> Template {
        match self {
            InitTemplate::LoraSft => Template::LoraSft,
            InitTemplate::QloraSft => Template::QloraSft,
            InitTemplate::FullSft => Template::FullSft,
            InitTemplate::Predict => Template::Predict,
        }
    }
}

impl std::str::FromStr for InitTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lora_sft" | "lora" => Ok(InitTemplate::LoraSft),
            "qlora_sft" | "qlora" => Ok(InitTemplate::QloraSft),
            "full_sft" | "full" => Ok(InitTemplate::FullSft),
            "predict" => Ok(InitTemplate::Predict),
            _ => Err(format!(
                "Unknown template: {}. Valid templates: lora_sft, qlora_sft, full_sft, predict",
                s
            )),
        }
    }
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
