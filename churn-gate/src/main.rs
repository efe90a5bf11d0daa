//! churn-gate - Main entry point
//!
//! Exit status: 0 when the model passes, 1 when it misses a threshold or
//! produces non-binary output, 2 when the model or dataset cannot be loaded.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use churn_common::config::TomlConfig;
use churn_common::PipelineModel;
use clap::Parser;
use tracing::{error, info};

use churn_gate::{evaluate, EvaluationDataset, GateThresholds};

/// Command-line arguments for churn-gate
#[derive(Parser, Debug)]
#[command(name = "churn-gate")]
#[command(about = "Check a churn model against accuracy and F1 minimums")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CHURN_CONFIG")]
    config: Option<PathBuf>,

    /// Model artifact to evaluate
    #[arg(short, long, env = "CHURN_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Labeled CSV with a `churn` column
    #[arg(short, long)]
    data: Option<PathBuf>,

    #[arg(long)]
    min_accuracy: Option<f64>,

    #[arg(long)]
    min_f1: Option<f64>,
}

const EXIT_FAILED: u8 = 1;
const EXIT_LOAD_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();
    let (config, config_origin) = match TomlConfig::load_or_default(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("churn-gate: {}", e);
            return ExitCode::from(EXIT_LOAD_ERROR);
        }
    };

    churn_common::logging::init_tracing(&config.logging.level);
    info!("Starting churn-gate v{}", env!("CARGO_PKG_VERSION"));
    config_origin.log();

    let model_path = args.model.unwrap_or(config.gate.model_path);
    let data_path = args.data.unwrap_or(config.gate.data_path);
    let thresholds = GateThresholds {
        min_accuracy: args.min_accuracy.unwrap_or(config.gate.min_accuracy),
        min_f1: args.min_f1.unwrap_or(config.gate.min_f1),
    };

    let (model, dataset) = match load_inputs(&model_path, &data_path) {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_LOAD_ERROR);
        }
    };
    info!(
        "Loaded {} rows ({} churn) from {}",
        dataset.len(),
        dataset.positives(),
        data_path.display()
    );

    let report = match evaluate(&model, &dataset) {
        Ok(report) => report,
        Err(e) => {
            error!("Gate failed: {}", e);
            return ExitCode::from(EXIT_FAILED);
        }
    };
    println!("{}", report);
    println!(
        "Required:  accuracy >= {:.2}%, F1 >= {:.4}",
        thresholds.min_accuracy * 100.0,
        thresholds.min_f1
    );

    match thresholds.check(&report) {
        Ok(()) => {
            println!("PASS");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("FAIL: {}", e);
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn load_inputs(model_path: &Path, data_path: &Path) -> Result<(PipelineModel, EvaluationDataset)> {
    let model = PipelineModel::load(model_path)
        .with_context(|| format!("Failed to load model {}", model_path.display()))?;
    let dataset = EvaluationDataset::from_path(data_path)
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;
    Ok((model, dataset))
}
