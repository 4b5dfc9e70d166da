use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use churn_classifiers::config::{PipelineConfig, ThresholdStrategy};

use crate::util::validate_csv_file;

/// Everything the `train` subcommand needs.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub csv: PathBuf,
    pub pipeline: PipelineConfig,
    pub plot: bool,
}

pub fn train_command() -> Command {
    Command::new("train")
        .about("Train the baseline and logistic regression, tune the threshold and save artifacts")
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Path to the raw customer CSV")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help(
                    "Path to a JSON pipeline configuration. \
                     Explicit flags override values from this file.",
                )
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .help("Name of the target column [default: Churn]")
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("test_size")
                .long("test-size")
                .help("Fraction of rows held out for testing [default: 0.25]")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("random_state")
                .long("random-state")
                .help("Seed for the stratified split [default: 42]")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("min_recall")
                .long("min-recall")
                .help("Minimum recall the chosen threshold must reach [default: 0.70]")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("min_precision")
                .long("min-precision")
                .help("Minimum precision the chosen threshold must reach [default: 0.40]")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("threshold_strategy")
                .long("threshold-strategy")
                .help("How to pick among thresholds meeting both constraints [default: first]")
                .value_parser(["first", "max_f1"])
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .help("Directory the model and metadata are written to [default: models]")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("plot")
                .long("plot")
                .help("Also write an HTML precision/recall plot into the output directory")
                .action(ArgAction::SetTrue),
        )
}

impl TrainConfig {
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut pipeline = match matches.get_one::<PathBuf>("config") {
            Some(config_path) => load_pipeline_config(config_path)?,
            None => PipelineConfig::default(),
        };

        // Apply CLI overrides
        if let Some(target) = matches.get_one::<String>("target") {
            pipeline.target_column = target.clone();
        }
        if let Some(&test_size) = matches.get_one::<f64>("test_size") {
            pipeline.test_size = test_size;
        }
        if let Some(&seed) = matches.get_one::<u64>("random_state") {
            pipeline.random_seed = seed;
        }
        if let Some(&min_recall) = matches.get_one::<f64>("min_recall") {
            pipeline.min_recall = min_recall;
        }
        if let Some(&min_precision) = matches.get_one::<f64>("min_precision") {
            pipeline.min_precision = min_precision;
        }
        if let Some(strategy) = matches.get_one::<String>("threshold_strategy") {
            pipeline.threshold_strategy = ThresholdStrategy::from_str(strategy)?;
        }
        if let Some(outdir) = matches.get_one::<PathBuf>("outdir") {
            pipeline.output_directory = outdir.clone();
        }

        pipeline
            .validate()
            .context("Invalid pipeline configuration")?;

        let csv = matches
            .get_one::<PathBuf>("csv")
            .cloned()
            .context("--csv is required")?;
        validate_csv_file(&csv)?;

        Ok(TrainConfig {
            csv,
            pipeline,
            plot: matches.get_flag("plot"),
        })
    }
}

/// Read a JSON pipeline configuration. Absent fields keep their defaults;
/// a field with an invalid value fails the whole load.
pub fn load_pipeline_config(config_path: &Path) -> Result<PipelineConfig> {
    let config_json = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
    let config: PipelineConfig = serde_json::from_str(&config_json)
        .with_context(|| format!("Invalid pipeline configuration in {:?}", config_path))?;
    log::debug!("Loaded pipeline configuration: {:?}", config);
    Ok(config)
}
