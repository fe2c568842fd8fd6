//! File-level integration tests for recipe loading and saving

use afinar::recipe::{
    generate_recipe, load_recipe, save_recipe, validate_recipe, Stage, Template,
};
use std::fs;

const LLAMA3_LORA_SFT: &str = r#"### model
model_name_or_path: meta-llama/Meta-Llama-3-8B-Instruct
trust_remote_code: true

### method
stage: sft
do_train: true
finetuning_type: lora
lora_rank: 8
lora_target: all

### dataset
dataset: identity,alpaca_en_demo
template: llama3
cutoff_len: 2048
max_samples: 1000
overwrite_cache: true
preprocessing_num_workers: 16

### output
output_dir: saves/llama3-8b/lora/sft
logging_steps: 10
save_steps: 500
plot_loss: true
overwrite_output_dir: true

### train
per_device_train_batch_size: 1
gradient_accumulation_steps: 8
learning_rate: 1.0e-4
num_train_epochs: 3.0
lr_scheduler_type: cosine
warmup_ratio: 0.1
bf16: true
ddp_timeout: 180000000

### eval
val_size: 0.1
per_device_eval_batch_size: 1
eval_strategy: steps
eval_steps: 500
"#;

#[test]
fn load_recipe_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("llama3_lora_sft.yaml");
    fs::write(&path, LLAMA3_LORA_SFT).unwrap();

    let recipe = load_recipe(&path).unwrap();
    assert_eq!(recipe.stage, Stage::Sft);
    assert_eq!(recipe.lora_rank, Some(8));
    assert!(validate_recipe(&recipe).is_ok());
}

#[test]
fn repeated_loads_yield_identical_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipe.yaml");
    fs::write(&path, LLAMA3_LORA_SFT).unwrap();

    let first = load_recipe(&path).unwrap();
    let second = load_recipe(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("generated.yaml");

    for template in [
        Template::LoraSft,
        Template::QloraSft,
        Template::FullSft,
        Template::Predict,
    ] {
        let recipe = generate_recipe(template, Some("Qwen/Qwen2-7B"), Some("alpaca_en_demo"));
        save_recipe(&recipe, &path).unwrap();
        let loaded = load_recipe(&path).unwrap();
        assert_eq!(recipe, loaded, "round trip mismatch for {template:?}");
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does_not_exist.yaml");

    let err = load_recipe(&path).unwrap_err();
    assert!(matches!(err, afinar::Error::Io(_)));
}

#[test]
fn invalid_file_reports_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(
        &path,
        "model_name_or_path: m\nstage: sft\ndo_train: true\nfinetuning_type: lora\n\
         lora_rank: 0\ndataset: d\noutput_dir: out\n",
    )
    .unwrap();

    let err = load_recipe(&path).unwrap_err();
    assert!(matches!(err, afinar::Error::Validation(_)));
}
