//! # Afinar: Fine-Tuning Recipe Toolkit
//!
//! Afinar defines the schema for flat YAML fine-tuning recipes (model,
//! method, dataset, output, train, and eval hyperparameter groups) and
//! provides loading, validation, and starter-template generation for them.
//!
//! The recipes themselves are consumed by an external training framework;
//! afinar is the guard rail in front of it. A recipe that loads cleanly here
//! has its required groups present, its numeric knobs in range, and its
//! enumerated choices spelled correctly.
//!
//! ## Architecture
//!
//! - **recipe**: schema, validation, and templates for training recipes
//! - **cli**: command-line interface (validate, show, init)
//!
//! ## Example
//!
//! ```
//! use afinar::recipe::{load_recipe_str, validate_recipe};
//!
//! let yaml = r#"
//! model_name_or_path: meta-llama/Meta-Llama-3-8B-Instruct
//! stage: sft
//! do_train: true
//! finetuning_type: lora
//! lora_rank: 8
//! lora_target: all
//! dataset: identity
//! template: llama3
//! output_dir: saves/llama3-8b/lora/sft
//! learning_rate: 1.0e-4
//! num_train_epochs: 3.0
//! "#;
//!
//! let recipe = load_recipe_str(yaml).unwrap();
//! assert!(validate_recipe(&recipe).is_ok());
//! ```

pub mod cli;
pub mod error;
pub mod recipe;

pub use error::{Error, Result};
pub use recipe::{load_recipe, load_recipe_str, save_recipe, TrainingRecipe};
