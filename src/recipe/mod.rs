//! Training recipes: declarative fine-tuning configuration
//!
//! A recipe is a flat YAML mapping handed wholesale to an external training
//! framework. This module defines the typed schema for the conventional
//! hyperparameter groups (model, method, dataset, output, train, eval),
//! validates field ranges and cross-field dependencies, and generates
//! starter recipes for common scenarios.
//!
//! ## Usage
//!
//! ```yaml
//! model_name_or_path: meta-llama/Meta-Llama-3-8B-Instruct
//! stage: sft
//! do_train: true
//! finetuning_type: lora
//! lora_rank: 8
//! lora_target: all
//! dataset: identity,alpaca_en_demo
//! template: llama3
//! output_dir: saves/llama3-8b/lora/sft
//! ```

mod schema;
mod templates;
mod validation;


pub use schema::{
    EvalStrategy, FinetuningType, FlashAttn, QuantizationMethod, ReportTo, SchedulerType, Stage,
    TrainingRecipe,
};
pub use templates::{generate_recipe, generate_yaml, Template};
pub use validation::{validate_recipe, RecipeError, ValidationResult};

use std::path::Path;

/// Load and validate a training recipe from a YAML file
pub fn load_recipe(path: &Path) -> crate::Result<TrainingRecipe> {
    let content = std::fs::read_to_string(path)?;
    load_recipe_str(&content)
}

/// Parse and validate a training recipe from YAML text
pub fn load_recipe_str(content: &str) -> crate::Result<TrainingRecipe> {
    let recipe: TrainingRecipe = serde_yaml::from_str(content)
        .map_err(|e| crate::Error::Parse(format!("Failed to parse recipe: {e}")))?;

    validate_recipe(&recipe)?;

    Ok(recipe)
}

/// Save a training recipe to a YAML file
pub fn save_recipe(recipe: &TrainingRecipe, path: &Path) -> crate::Result<()> {
    let content = serde_yaml::to_string(recipe)
        .map_err(|e| crate::Error::Serialization(format!("Failed to serialize recipe: {e}")))?;

    std::fs::write(path, content)?;

    Ok(())
}
