//! Afinar CLI
//!
//! Entry point for the afinar recipe toolkit.
//!
//! # Usage
//!
//! ```bash
//! # Validate recipe files
//! afinar validate llama3_lora_sft.yaml
//! afinar validate recipes/*.yaml --detailed
//!
//! # Show a recipe
//! afinar show llama3_lora_sft.yaml --format json
//!
//! # Generate a starter recipe
//! afinar init recipe.yaml --template qlora_sft --model Qwen/Qwen2-7B-Instruct
//! ```

use afinar::cli::{Cli, Command, InitArgs, OutputFormat, ShowArgs, ValidateArgs};
use afinar::recipe::{generate_recipe, load_recipe, save_recipe, validate_recipe, TrainingRecipe};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    let result = match cli.command {
        Command::Validate(args) => run_validate(args, log_level),
        Command::Show(args) => run_show(args, log_level),
        Command::Init(args) => run_init(args, log_level),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    let mut failures = 0usize;

    for config in &args.configs {
        match load_recipe(config) {
            Ok(recipe) => {
                log(
                    level,
                    LogLevel::Normal,
                    &format!("{}: valid", config.display()),
                );
                if args.detailed {
                    print_summary(&recipe);
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {e}", config.display());
            }
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} recipe(s) failed validation",
            args.configs.len()
        ));
    }

    log(
        level,
        LogLevel::Verbose,
        &format!("All {} recipe(s) valid", args.configs.len()),
    );
    Ok(())
}

fn print_summary(recipe: &TrainingRecipe) {
    println!();
    println!("  Model: {}", recipe.model_name_or_path);
    if let Some(adapter) = &recipe.adapter_name_or_path {
        println!("  Adapter: {adapter}");
    }
    if let Some(bits) = recipe.quantization_bit {
        let method = recipe
            .quantization_method
            .map(|m| m.to_string())
            .unwrap_or_else(|| "bnb".to_string());
        println!("  Quantization: {bits}-bit ({method})");
    }
    println!();
    println!("  Stage: {}", recipe.stage);
    println!("  Finetuning type: {}", recipe.finetuning_type);
    if let Some(rank) = recipe.lora_rank {
        println!("  LoRA rank: {rank}");
    }
    if let Some(target) = &recipe.lora_target {
        println!("  LoRA target: {target}");
    }
    println!();
    println!("  Dataset: {}", recipe.dataset);
    if let Some(template) = &recipe.template {
        println!("  Template: {template}");
    }
    if let Some(cutoff) = recipe.cutoff_len {
        println!("  Cutoff length: {cutoff}");
    }
    println!();
    println!("  Output dir: {}", recipe.output_dir.display());
    if let Some(lr) = recipe.learning_rate {
        println!("  Learning rate: {lr}");
    }
    if let Some(epochs) = recipe.num_train_epochs {
        println!("  Epochs: {epochs}");
    }
    if let Some(batch) = recipe.per_device_train_batch_size {
        println!("  Batch size: {batch}");
    }
    if let Some(strategy) = recipe.eval_strategy {
        println!("  Eval strategy: {strategy}");
    }
    if !recipe.extra.is_empty() {
        let keys: Vec<&str> = recipe.extra.keys().map(String::as_str).collect();
        println!("  Passthrough keys: {}", keys.join(", "));
    }
    println!();
}

fn run_show(args: ShowArgs, level: LogLevel) -> Result<(), String> {
    let recipe = load_recipe(&args.config).map_err(|e| format!("Recipe error: {e}"))?;

    match args.format {
        OutputFormat::Text => {
            log(
                level,
                LogLevel::Normal,
                &format!("Recipe: {}", args.config.display()),
            );
            print_summary(&recipe);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&recipe)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&recipe)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}

fn run_init(args: InitArgs, level: LogLevel) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        ));
    }

    let recipe = generate_recipe(
        args.template.to_template(),
        args.model.as_deref(),
        args.dataset.as_deref(),
    );

    validate_recipe(&recipe).map_err(|e| format!("Generated recipe invalid: {e}"))?;

    save_recipe(&recipe, &args.path).map_err(|e| format!("Write error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Wrote {:?} recipe to {}",
            args.template,
            args.path.display()
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("  Model: {}", recipe.model_name_or_path),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("  Dataset: {}", recipe.dataset),
    );

    Ok(())
}
