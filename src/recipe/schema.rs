//! Training recipe schema
//!
//! A recipe is a flat YAML mapping of hyperparameters, organized by
//! convention into model, method, dataset, output, train, and eval groups.
//! The external training framework owns the authoritative key set, so keys
//! this schema does not model are preserved in [`TrainingRecipe::extra`]
//! rather than rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A flat fine-tuning recipe.
///
/// # Required Fields
/// - `model_name_or_path`: model identifier or local path
/// - `stage`: training stage (`sft`, `dpo`, ...)
/// - `finetuning_type`: technique (`lora`, `full`, `freeze`)
/// - `dataset`: dataset identifier (free-form, comma-separated list allowed)
/// - `output_dir`: directory for checkpoints and logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecipe {
    // ------------------------------------------------------------------
    // model
    // ------------------------------------------------------------------
    /// Model identifier or local path (required)
    pub model_name_or_path: String,

    /// Path to a previously trained adapter to resume from or stack on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter_name_or_path: Option<String>,

    /// Quantization bit-width for the base model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_bit: Option<u8>,

    /// Quantization backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_method: Option<QuantizationMethod>,

    /// Allow execution of remote modeling code shipped with the checkpoint
    #[serde(default)]
    pub trust_remote_code: bool,

    /// Attention implementation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_attn: Option<FlashAttn>,

    // ------------------------------------------------------------------
    // method
    // ------------------------------------------------------------------
    /// Training stage (required)
    pub stage: Stage,

    /// Run training
    #[serde(default)]
    pub do_train: bool,

    /// Run batch prediction
    #[serde(default)]
    pub do_predict: bool,

    /// Fine-tuning technique (required)
    pub finetuning_type: FinetuningType,

    /// Rank of the LoRA decomposition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lora_rank: Option<usize>,

    /// LoRA target modules: `all` or a comma-separated module list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lora_target: Option<String>,

    // ------------------------------------------------------------------
    // dataset
    // ------------------------------------------------------------------
    /// Dataset identifier (required, not resolved against any registry)
    pub dataset: String,

    /// Prompt template identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Maximum token sequence length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_len: Option<usize>,

    /// Cap on the number of training samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_samples: Option<usize>,

    /// Rebuild the tokenized dataset cache
    #[serde(default)]
    pub overwrite_cache: bool,

    /// Worker processes for dataset preprocessing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocessing_num_workers: Option<usize>,

    /// Worker processes for the data loader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataloader_num_workers: Option<usize>,

    // ------------------------------------------------------------------
    // output
    // ------------------------------------------------------------------
    /// Output directory (required)
    pub output_dir: PathBuf,

    /// Log metrics every N steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_steps: Option<usize>,

    /// Save a checkpoint every N steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_steps: Option<usize>,

    /// Plot the loss curve after training
    #[serde(default)]
    pub plot_loss: bool,

    /// Overwrite a non-empty output directory
    #[serde(default)]
    pub overwrite_output_dir: bool,

    /// Save model weights only, without optimizer state
    #[serde(default)]
    pub save_only_model: bool,

    /// Experiment tracker backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_to: Option<ReportTo>,

    // ------------------------------------------------------------------
    // train
    // ------------------------------------------------------------------
    /// Per-device training batch size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_device_train_batch_size: Option<usize>,

    /// Gradient accumulation steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_accumulation_steps: Option<usize>,

    /// Peak learning rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,

    /// Number of training epochs (fractional allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_train_epochs: Option<f64>,

    /// Learning-rate schedule shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lr_scheduler_type: Option<SchedulerType>,

    /// Warmup fraction of total steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup_ratio: Option<f64>,

    /// Train in bfloat16
    #[serde(default)]
    pub bf16: bool,

    /// Train in float16
    #[serde(default)]
    pub fp16: bool,

    /// Distributed process-group timeout in seconds (opaque pass-through)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddp_timeout: Option<u64>,

    /// Checkpoint path to resume from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_from_checkpoint: Option<String>,

    // ------------------------------------------------------------------
    // eval
    // ------------------------------------------------------------------
    /// Fraction of the dataset held out for validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val_size: Option<f64>,

    /// Per-device evaluation batch size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_device_eval_batch_size: Option<usize>,

    /// Evaluation cadence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_strategy: Option<EvalStrategy>,

    /// Evaluate every N steps (when `eval_strategy: steps`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_steps: Option<usize>,

    // ------------------------------------------------------------------
    // passthrough
    // ------------------------------------------------------------------
    /// Keys owned by the external framework that this schema does not model
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Training stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Continued pre-training
    Pt,
    /// Supervised fine-tuning
    Sft,
    /// Reward modeling
    Rm,
    /// Proximal policy optimization
    Ppo,
    /// Direct preference optimization
    Dpo,
    /// Kahneman-Tversky optimization
    Kto,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pt => "pt",
            Stage::Sft => "sft",
            Stage::Rm => "rm",
            Stage::Ppo => "ppo",
            Stage::Dpo => "dpo",
            Stage::Kto => "kto",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-tuning technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinetuningType {
    /// Low-rank adaptation
    Lora,
    /// Full-parameter tuning
    Full,
    /// Partial-parameter tuning with frozen layers
    Freeze,
}

impl FinetuningType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinetuningType::Lora => "lora",
            FinetuningType::Full => "full",
            FinetuningType::Freeze => "freeze",
        }
    }
}

impl fmt::Display for FinetuningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantization backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizationMethod {
    /// bitsandbytes
    Bnb,
    /// Half-Quadratic Quantization
    Hqq,
    /// EETQ int8
    Eetq,
}

impl QuantizationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantizationMethod::Bnb => "bnb",
            QuantizationMethod::Hqq => "hqq",
            QuantizationMethod::Eetq => "eetq",
        }
    }
}

impl fmt::Display for QuantizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attention implementation choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashAttn {
    Auto,
    Disabled,
    Sdpa,
    Fa2,
}

impl FlashAttn {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashAttn::Auto => "auto",
            FlashAttn::Disabled => "disabled",
            FlashAttn::Sdpa => "sdpa",
            FlashAttn::Fa2 => "fa2",
        }
    }
}

impl fmt::Display for FlashAttn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learning-rate schedule shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerType {
    Linear,
    Cosine,
    CosineWithRestarts,
    Polynomial,
    Constant,
    ConstantWithWarmup,
}

impl SchedulerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerType::Linear => "linear",
            SchedulerType::Cosine => "cosine",
            SchedulerType::CosineWithRestarts => "cosine_with_restarts",
            SchedulerType::Polynomial => "polynomial",
            SchedulerType::Constant => "constant",
            SchedulerType::ConstantWithWarmup => "constant_with_warmup",
        }
    }
}

impl fmt::Display for SchedulerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalStrategy {
    /// No evaluation during training
    No,
    /// Evaluate every `eval_steps` steps
    Steps,
    /// Evaluate at the end of each epoch
    Epoch,
}

impl EvalStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvalStrategy::No => "no",
            EvalStrategy::Steps => "steps",
            EvalStrategy::Epoch => "epoch",
        }
    }
}

impl fmt::Display for EvalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Experiment tracker backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTo {
    /// Disable experiment tracking
    None,
    Wandb,
    Tensorboard,
    Mlflow,
    Swanlab,
}

impl ReportTo {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTo::None => "none",
            ReportTo::Wandb => "wandb",
            ReportTo::Tensorboard => "tensorboard",
            ReportTo::Mlflow => "mlflow",
            ReportTo::Swanlab => "swanlab",
        }
    }
}

impl fmt::Display for ReportTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_recipe() {
        let yaml = r#"
model_name_or_path: meta-llama/Meta-Llama-3-8B-Instruct
stage: sft
finetuning_type: lora
dataset: alpaca_en_demo
output_dir: saves/llama3-8b/lora/sft
"#;
        let recipe: TrainingRecipe = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            recipe.model_name_or_path,
            "meta-llama/Meta-Llama-3-8B-Instruct"
        );
        assert_eq!(recipe.stage, Stage::Sft);
        assert_eq!(recipe.finetuning_type, FinetuningType::Lora);
        assert!(!recipe.do_train);
        assert!(recipe.extra.is_empty());
    }

    #[test]
    fn test_deserialize_full_recipe() {
        let yaml = r#"
model_name_or_path: Qwen/Qwen2-7B-Instruct
adapter_name_or_path: saves/qwen2-7b/lora/sft
quantization_bit: 4
quantization_method: bnb
trust_remote_code: true
flash_attn: fa2

stage: sft
do_train: true
finetuning_type: lora
lora_rank: 16
lora_target: all

dataset: identity,alpaca_en_demo
template: qwen
cutoff_len: 2048
max_samples: 1000
overwrite_cache: true
preprocessing_num_workers: 16
dataloader_num_workers: 4

output_dir: saves/qwen2-7b/lora/sft
logging_steps: 10
save_steps: 500
plot_loss: true
overwrite_output_dir: true
save_only_model: false
report_to: none

per_device_train_batch_size: 1
gradient_accumulation_steps: 8
learning_rate: 1.0e-4
num_train_epochs: 3.0
lr_scheduler_type: cosine
warmup_ratio: 0.1
bf16: true
ddp_timeout: 180000000

val_size: 0.1
per_device_eval_batch_size: 1
eval_strategy: steps
eval_steps: 500
"#;
        let recipe: TrainingRecipe = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(recipe.quantization_bit, Some(4));
        assert_eq!(recipe.quantization_method, Some(QuantizationMethod::Bnb));
        assert_eq!(recipe.flash_attn, Some(FlashAttn::Fa2));
        assert_eq!(recipe.lora_rank, Some(16));
        assert_eq!(recipe.lora_target.as_deref(), Some("all"));
        assert_eq!(recipe.cutoff_len, Some(2048));
        assert_eq!(recipe.report_to, Some(ReportTo::None));
        assert_eq!(recipe.lr_scheduler_type, Some(SchedulerType::Cosine));
        assert_eq!(recipe.eval_strategy, Some(EvalStrategy::Steps));
        assert_eq!(recipe.ddp_timeout, Some(180_000_000));
        assert!(recipe.bf16);
        assert!(!recipe.fp16);
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let yaml = r#"
model_name_or_path: model
stage: sft
finetuning_type: full
dataset: data
output_dir: out
deepspeed: examples/deepspeed/ds_z3_config.json
packing: true
"#;
        let recipe: TrainingRecipe = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(recipe.extra.len(), 2);
        assert!(recipe.extra.contains_key("deepspeed"));
        assert_eq!(
            recipe.extra.get("packing"),
            Some(&serde_yaml::Value::Bool(true))
        );
    }

    #[test]
    fn test_missing_required_key_is_error() {
        let yaml = r#"
stage: sft
finetuning_type: lora
dataset: data
output_dir: out
"#;
        let result: Result<TrainingRecipe, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_choice_is_error() {
        let yaml = r#"
model_name_or_path: model
stage: sft
finetuning_type: lora
dataset: data
output_dir: out
quantization_method: gptq
"#;
        let result: Result<TrainingRecipe, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_choice_enums_round_trip_as_snake_case() {
        assert_eq!(serde_yaml::to_string(&Stage::Sft).unwrap().trim(), "sft");
        assert_eq!(
            serde_yaml::to_string(&SchedulerType::CosineWithRestarts)
                .unwrap()
                .trim(),
            "cosine_with_restarts"
        );
        assert_eq!(
            serde_yaml::to_string(&ReportTo::None).unwrap().trim(),
            "none"
        );
        let fa: FlashAttn = serde_yaml::from_str("fa2").unwrap();
        assert_eq!(fa, FlashAttn::Fa2);
    }

    #[test]
    fn test_display_matches_serde_token() {
        assert_eq!(Stage::Dpo.to_string(), "dpo");
        assert_eq!(FinetuningType::Freeze.to_string(), "freeze");
        assert_eq!(QuantizationMethod::Eetq.to_string(), "eetq");
        assert_eq!(EvalStrategy::Epoch.to_string(), "epoch");
    }
}
