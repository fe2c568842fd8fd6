//! Recipe validation
//!
//! Schema validation catches bad hyperparameters at parse time, before the
//! recipe ever reaches the training framework. Checks cover required fields,
//! numeric ranges, mutual exclusivity, and cross-field dependencies.

use super::schema::{EvalStrategy, FinetuningType, QuantizationMethod, TrainingRecipe};
use thiserror::Error;

/// Validation result type
pub type ValidationResult<T> = Result<T, RecipeError>;

/// Recipe validation errors
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Empty required field: {0}")]
    EmptyRequiredField(String),

    #[error("Invalid range for {field}: {value} (expected {constraint})")]
    InvalidRange {
        field: String,
        value: String,
        constraint: String,
    },

    #[error("Mutually exclusive fields specified: {field1} and {field2}")]
    MutuallyExclusive { field1: String, field2: String },

    #[error("Invalid quantization bits for {method}: {bits}. Valid values: {valid:?}")]
    InvalidQuantBits {
        method: QuantizationMethod,
        bits: u8,
        valid: &'static [u8],
    },

    #[error("Dependency error: {0}")]
    DependencyError(String),

    #[error("No action selected: set at least one of do_train, do_predict")]
    NoAction,
}

/// Valid bit-widths for bitsandbytes quantization
const BNB_BITS: &[u8] = &[4, 8];

/// Valid bit-widths for HQQ quantization
const HQQ_BITS: &[u8] = &[2, 3, 4, 5, 6, 8];

/// Valid bit-widths for EETQ quantization
const EETQ_BITS: &[u8] = &[8];

/// Validate a training recipe
///
/// Performs comprehensive validation including:
/// 1. Required fields presence (model, dataset, output directory)
/// 2. Action flags
/// 3. Quantization bit-width vs. backend
/// 4. Method-group dependencies (LoRA knobs)
/// 5. Train-schedule ranges
/// 6. Eval-schedule ranges and dependencies
pub fn validate_recipe(recipe: &TrainingRecipe) -> ValidationResult<()> {
    validate_required_fields(recipe)?;
    validate_actions(recipe)?;
    validate_model(recipe)?;
    validate_method(recipe)?;
    validate_train(recipe)?;
    validate_eval(recipe)?;
    Ok(())
}

/// Validate required string fields are non-empty
fn validate_required_fields(recipe: &TrainingRecipe) -> ValidationResult<()> {
    if recipe.model_name_or_path.is_empty() {
        return Err(RecipeError::EmptyRequiredField(
            "model_name_or_path".to_string(),
        ));
    }

    if recipe.dataset.is_empty() {
        return Err(RecipeError::EmptyRequiredField("dataset".to_string()));
    }

    if recipe.output_dir.as_os_str().is_empty() {
        return Err(RecipeError::EmptyRequiredField("output_dir".to_string()));
    }

    Ok(())
}

/// At least one action flag must be set
fn validate_actions(recipe: &TrainingRecipe) -> ValidationResult<()> {
    if !recipe.do_train && !recipe.do_predict {
        return Err(RecipeError::NoAction);
    }
    Ok(())
}

/// Validate the model group (quantization settings)
fn validate_model(recipe: &TrainingRecipe) -> ValidationResult<()> {
    if let Some(bits) = recipe.quantization_bit {
        // bnb is the framework default when only a bit-width is given
        let method = recipe
            .quantization_method
            .unwrap_or(QuantizationMethod::Bnb);

        let valid = match method {
            QuantizationMethod::Bnb => BNB_BITS,
            QuantizationMethod::Hqq => HQQ_BITS,
            QuantizationMethod::Eetq => EETQ_BITS,
        };

        if !valid.contains(&bits) {
            return Err(RecipeError::InvalidQuantBits {
                method,
                bits,
                valid,
            });
        }
    } else if recipe.quantization_method.is_some() {
        return Err(RecipeError::DependencyError(
            "quantization_method requires quantization_bit".to_string(),
        ));
    }

    Ok(())
}

/// Validate the method group (LoRA dependencies)
fn validate_method(recipe: &TrainingRecipe) -> ValidationResult<()> {
    let is_lora = recipe.finetuning_type == FinetuningType::Lora;

    if let Some(rank) = recipe.lora_rank {
        if !is_lora {
            return Err(RecipeError::DependencyError(format!(
                "lora_rank requires finetuning_type: lora (got {})",
                recipe.finetuning_type
            )));
        }
        if rank == 0 {
            return Err(RecipeError::InvalidRange {
                field: "lora_rank".to_string(),
                value: rank.to_string(),
                constraint: ">= 1".to_string(),
            });
        }
    }

    if let Some(ref target) = recipe.lora_target {
        if !is_lora {
            return Err(RecipeError::DependencyError(format!(
                "lora_target requires finetuning_type: lora (got {})",
                recipe.finetuning_type
            )));
        }
        if target.is_empty() {
            return Err(RecipeError::EmptyRequiredField("lora_target".to_string()));
        }
    }

    // Adapters only stack on LoRA tuning
    if recipe.adapter_name_or_path.is_some() && !is_lora {
        return Err(RecipeError::DependencyError(
            "adapter_name_or_path requires finetuning_type: lora".to_string(),
        ));
    }

    Ok(())
}

/// Validate the train schedule group
fn validate_train(recipe: &TrainingRecipe) -> ValidationResult<()> {
    if recipe.bf16 && recipe.fp16 {
        return Err(RecipeError::MutuallyExclusive {
            field1: "bf16".to_string(),
            field2: "fp16".to_string(),
        });
    }

    if let Some(lr) = recipe.learning_rate {
        if lr <= 0.0 || !lr.is_finite() {
            return Err(RecipeError::InvalidRange {
                field: "learning_rate".to_string(),
                value: lr.to_string(),
                constraint: "> 0".to_string(),
            });
        }
    }

    if let Some(epochs) = recipe.num_train_epochs {
        if epochs <= 0.0 || !epochs.is_finite() {
            return Err(RecipeError::InvalidRange {
                field: "num_train_epochs".to_string(),
                value: epochs.to_string(),
                constraint: "> 0".to_string(),
            });
        }
    }

    if let Some(ratio) = recipe.warmup_ratio {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(RecipeError::InvalidRange {
                field: "warmup_ratio".to_string(),
                value: ratio.to_string(),
                constraint: "in [0, 1]".to_string(),
            });
        }
    }

    for (field, value) in [
        (
            "per_device_train_batch_size",
            recipe.per_device_train_batch_size,
        ),
        (
            "gradient_accumulation_steps",
            recipe.gradient_accumulation_steps,
        ),
        ("cutoff_len", recipe.cutoff_len),
        ("max_samples", recipe.max_samples),
        ("logging_steps", recipe.logging_steps),
        ("save_steps", recipe.save_steps),
    ] {
        if value == Some(0) {
            return Err(RecipeError::InvalidRange {
                field: field.to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
    }

    Ok(())
}

/// Validate the eval schedule group
fn validate_eval(recipe: &TrainingRecipe) -> ValidationResult<()> {
    if let Some(val_size) = recipe.val_size {
        if !(0.0..=1.0).contains(&val_size) {
            return Err(RecipeError::InvalidRange {
                field: "val_size".to_string(),
                value: val_size.to_string(),
                constraint: "in [0, 1]".to_string(),
            });
        }
    }

    if recipe.per_device_eval_batch_size == Some(0) {
        return Err(RecipeError::InvalidRange {
            field: "per_device_eval_batch_size".to_string(),
            value: "0".to_string(),
            constraint: ">= 1".to_string(),
        });
    }

    match recipe.eval_strategy {
        Some(EvalStrategy::Steps) => {
            if recipe.eval_steps.is_none() {
                return Err(RecipeError::DependencyError(
                    "eval_strategy: steps requires eval_steps".to_string(),
                ));
            }
            if recipe.eval_steps == Some(0) {
                return Err(RecipeError::InvalidRange {
                    field: "eval_steps".to_string(),
                    value: "0".to_string(),
                    constraint: ">= 1".to_string(),
                });
            }
        }
        Some(EvalStrategy::No) => {
            // Holding out data with evaluation disabled is almost always a
            // config mistake.
            if recipe.val_size.is_some_and(|v| v > 0.0) {
                return Err(RecipeError::DependencyError(
                    "val_size > 0 requires eval_strategy: steps or epoch".to_string(),
                ));
            }
        }
        _ => {}
    }

    Ok(())
}
