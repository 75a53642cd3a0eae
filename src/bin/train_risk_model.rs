//! Train the risk classifier from a usage CSV and write the model artifact.
//!
//! Usage: train-risk-model --input risk_dataset.csv --output risk_model.json
//!        train-risk-model --synthetic 2000 --input risk_dataset.csv

use anyhow::{bail, Context, Result};
use clap::Parser;
use screentime_risk::config::AppConfig;
use screentime_risk::logging::{LogEvent, StructuredLogger};
use screentime_risk::training::{self, read_usage_csv, synthetic_records, write_usage_csv};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the screen-usage risk classifier")]
struct Args {
    /// Usage CSV (instagram, youtube, whatsapp, study, night_usage, red_days)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Artifact path (defaults to model.path from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Generate N synthetic rows instead of reading --input (written to --input if given)
    #[arg(long)]
    synthetic: Option<usize>,

    /// Number of trees
    #[arg(short, long)]
    trees: Option<usize>,

    /// Max tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Holdout fraction for evaluation (0 disables)
    #[arg(long)]
    test_ratio: Option<f64>,

    /// Config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?
        .with_env_overrides();
    StructuredLogger::init(&config.log)?;

    let mut training_config = config.training.clone();
    if let Some(t) = args.trees {
        training_config.n_trees = t;
    }
    if let Some(d) = args.max_depth {
        training_config.max_depth = d;
    }
    if let Some(s) = args.seed {
        training_config.seed = s;
    }
    if let Some(r) = args.test_ratio {
        training_config.test_ratio = r;
    }

    let records = match (args.synthetic, &args.input) {
        (Some(n), input) => {
            let records = synthetic_records(n, training_config.seed);
            if let Some(path) = input {
                write_usage_csv(path, &records)
                    .with_context(|| format!("writing synthetic dataset to {}", path.display()))?;
                info!(rows = n, path = %path.display(), "synthetic dataset written");
            }
            records
        }
        (None, Some(path)) => read_usage_csv(path)
            .with_context(|| format!("reading dataset {}", path.display()))?,
        (None, None) => bail!("either --input or --synthetic is required"),
    };

    let (artifact, report) = training::train(&records, &training_config)?;
    let output = args.output.unwrap_or(config.model.path);
    artifact
        .save(&output)
        .with_context(|| format!("saving artifact to {}", output.display()))?;

    println!("Samples: {}", report.n_samples);
    for (label, count) in &report.label_counts {
        println!("  {label}: {count}");
    }
    if let Some(ref eval) = report.holdout {
        println!("Holdout accuracy: {:.4} ({} rows)", eval.accuracy, eval.n_samples);
    }
    if let Some(oob) = report.oob_accuracy {
        println!("OOB accuracy: {:.4}", oob);
    }
    println!("Feature importances:");
    for (name, imp) in &report.feature_importances {
        println!("  {name}: {imp:.4}");
    }
    println!("Model saved to {}", output.display());

    StructuredLogger::emit_json(
        &LogEvent::info("train_risk_model", "training report", &report),
        &mut std::io::stdout(),
    )?;
    Ok(())
}
