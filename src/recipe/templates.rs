//! Starter recipe generation
//!
//! Generates recipes for common fine-tuning scenarios. Every generated
//! recipe passes [`validate_recipe`](super::validation::validate_recipe).

use super::schema::{
    EvalStrategy, FinetuningType, FlashAttn, QuantizationMethod, ReportTo, SchedulerType, Stage,
    TrainingRecipe,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Template type for recipe initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// LoRA supervised fine-tuning
    LoraSft,
    /// QLoRA supervised fine-tuning (4-bit bitsandbytes base)
    QloraSft,
    /// Full-parameter supervised fine-tuning
    FullSft,
    /// Batch prediction with a trained adapter
    Predict,
}

/// Generate a training recipe from a template
pub fn generate_recipe(
    template: Template,
    model: Option<&str>,
    dataset: Option<&str>,
) -> TrainingRecipe {
    match template {
        Template::LoraSft => generate_lora_sft(model, dataset),
        Template::QloraSft => generate_qlora_sft(model, dataset),
        Template::FullSft => generate_full_sft(model, dataset),
        Template::Predict => generate_predict(model, dataset),
    }
}

/// Generate YAML text from a template
pub fn generate_yaml(template: Template, model: Option<&str>, dataset: Option<&str>) -> String {
    let recipe = generate_recipe(template, model, dataset);
    serde_yaml::to_string(&recipe).unwrap_or_else(|_| "# Error generating YAML".to_string())
}

const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";
const DEFAULT_DATASET: &str = "identity,alpaca_en_demo";

fn generate_lora_sft(model: Option<&str>, dataset: Option<&str>) -> TrainingRecipe {
    TrainingRecipe {
        model_name_or_path: model.unwrap_or(DEFAULT_MODEL).to_string(),
        adapter_name_or_path: None,
        quantization_bit: None,
        quantization_method: None,
        trust_remote_code: true,
        flash_attn: None,

        stage: Stage::Sft,
        do_train: true,
        do_predict: false,
        finetuning_type: FinetuningType::Lora,
        lora_rank: Some(8),
        lora_target: Some("all".to_string()),

        dataset: dataset.unwrap_or(DEFAULT_DATASET).to_string(),
        template: Some("llama3".to_string()),
        cutoff_len: Some(2048),
        max_samples: Some(1000),
        overwrite_cache: true,
        preprocessing_num_workers: Some(16),
        dataloader_num_workers: Some(4),

        output_dir: PathBuf::from("saves/llama3-8b/lora/sft"),
        logging_steps: Some(10),
        save_steps: Some(500),
        plot_loss: true,
        overwrite_output_dir: true,
        save_only_model: false,
        report_to: Some(ReportTo::None),

        per_device_train_batch_size: Some(1),
        gradient_accumulation_steps: Some(8),
        learning_rate: Some(1.0e-4),
        num_train_epochs: Some(3.0),
        lr_scheduler_type: Some(SchedulerType::Cosine),
        warmup_ratio: Some(0.1),
        bf16: true,
        fp16: false,
        ddp_timeout: Some(180_000_000),
        resume_from_checkpoint: None,

        val_size: Some(0.1),
        per_device_eval_batch_size: Some(1),
        eval_strategy: Some(EvalStrategy::Steps),
        eval_steps: Some(500),

        extra: BTreeMap::new(),
    }
}

fn generate_qlora_sft(model: Option<&str>, dataset: Option<&str>) -> TrainingRecipe {
    let mut recipe = generate_lora_sft(model, dataset);

    // Quantize the frozen base to 4-bit
    recipe.quantization_bit = Some(4);
    recipe.quantization_method = Some(QuantizationMethod::Bnb);
    recipe.output_dir = PathBuf::from("saves/llama3-8b/qlora/sft");

    // Quantized bases leave headroom for a larger accumulation window
    recipe.gradient_accumulation_steps = Some(16);

    recipe
}

fn generate_full_sft(model: Option<&str>, dataset: Option<&str>) -> TrainingRecipe {
    let mut recipe = generate_lora_sft(model, dataset);

    recipe.finetuning_type = FinetuningType::Full;
    recipe.lora_rank = None;
    recipe.lora_target = None;
    recipe.output_dir = PathBuf::from("saves/llama3-8b/full/sft");

    // Full-parameter tuning wants a much lower peak LR
    recipe.learning_rate = Some(1.0e-5);
    recipe.flash_attn = Some(FlashAttn::Fa2);

    recipe
}

fn generate_predict(model: Option<&str>, dataset: Option<&str>) -> TrainingRecipe {
    let mut recipe = generate_lora_sft(model, dataset);

    recipe.do_train = false;
    recipe.do_predict = true;
    recipe.adapter_name_or_path = Some("saves/llama3-8b/lora/sft".to_string());
    recipe.output_dir = PathBuf::from("saves/llama3-8b/lora/predict");
    recipe.max_samples = Some(50);

    // Training and eval schedules do not apply to prediction
    recipe.lora_rank = None;
    recipe.lora_target = None;
    recipe.logging_steps = None;
    recipe.save_steps = None;
    recipe.plot_loss = false;
    recipe.per_device_train_batch_size = None;
    recipe.gradient_accumulation_steps = None;
    recipe.learning_rate = None;
    recipe.num_train_epochs = None;
    recipe.lr_scheduler_type = None;
    recipe.warmup_ratio = None;
    recipe.ddp_timeout = None;
    recipe.val_size = None;
    recipe.per_device_eval_batch_size = Some(1);
    recipe.eval_strategy = None;
    recipe.eval_steps = None;

    recipe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::validation::validate_recipe;

    #[test]
    fn test_generate_lora_sft() {
        let recipe = generate_recipe(Template::LoraSft, Some("Qwen/Qwen2-7B"), None);
        assert_eq!(recipe.model_name_or_path, "Qwen/Qwen2-7B");
        assert_eq!(recipe.stage, Stage::Sft);
        assert_eq!(recipe.finetuning_type, FinetuningType::Lora);
        assert_eq!(recipe.lora_rank, Some(8));
        assert!(recipe.quantization_bit.is_none());
        assert!(recipe.do_train);
    }

    #[test]
    fn test_generate_qlora_sft() {
        let recipe = generate_recipe(Template::QloraSft, None, None);
        assert_eq!(recipe.quantization_bit, Some(4));
        assert_eq!(recipe.quantization_method, Some(QuantizationMethod::Bnb));
        assert_eq!(recipe.gradient_accumulation_steps, Some(16));
    }

    #[test]
    fn test_generate_full_sft() {
        let recipe = generate_recipe(Template::FullSft, None, Some("alpaca_en_demo"));
        assert_eq!(recipe.finetuning_type, FinetuningType::Full);
        assert!(recipe.lora_rank.is_none());
        assert!(recipe.lora_target.is_none());
        assert_eq!(recipe.learning_rate, Some(1.0e-5));
        assert_eq!(recipe.dataset, "alpaca_en_demo");
    }

    #[test]
    fn test_generate_predict() {
        let recipe = generate_recipe(Template::Predict, None, None);
        assert!(!recipe.do_train);
        assert!(recipe.do_predict);
        assert!(recipe.adapter_name_or_path.is_some());
        assert!(recipe.learning_rate.is_none());
    }

    #[test]
    fn test_all_templates_validate() {
        for template in [
            Template::LoraSft,
            Template::QloraSft,
            Template::FullSft,
            Template::Predict,
        ] {
            let recipe = generate_recipe(template, None, None);
            let result = validate_recipe(&recipe);
            assert!(
                result.is_ok(),
                "Template {:?} produced invalid recipe: {:?}",
                template,
                result
            );
        }
    }

    #[test]
    fn test_generate_yaml_output() {
        let yaml = generate_yaml(Template::LoraSft, None, None);
        assert!(yaml.contains("model_name_or_path:"));
        assert!(yaml.contains("stage: sft"));
        assert!(yaml.contains("finetuning_type: lora"));
        // Unset options stay out of the generated file
        assert!(!yaml.contains("resume_from_checkpoint"));
    }

    #[test]
    fn test_generated_yaml_parses_back() {
        for template in [
            Template::LoraSft,
            Template::QloraSft,
            Template::FullSft,
            Template::Predict,
        ] {
            let yaml = generate_yaml(template, None, None);
            let parsed: TrainingRecipe = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(parsed, generate_recipe(template, None, None));
        }
    }
}
