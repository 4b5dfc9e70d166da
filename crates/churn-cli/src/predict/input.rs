use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::path::PathBuf;

use crate::util::validate_csv_file;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictConfig {
    pub csv: PathBuf,
    pub model_dir: PathBuf,
    pub target_column: String,
    pub output: Option<PathBuf>,
    pub strict: bool,
}

impl Default for PredictConfig {
    fn default() -> Self {
        PredictConfig {
            csv: PathBuf::new(),
            model_dir: PathBuf::from("models"),
            target_column: String::from("Churn"),
            output: None,
            strict: false,
        }
    }
}

pub fn predict_command() -> Command {
    Command::new("predict")
        .about("Score a customer CSV with a saved model and its tuned threshold")
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Path to the customer CSV to score")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("model_dir")
                .long("model-dir")
                .help("Directory holding the saved model and metadata [default: models]")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .help("Target column to drop if the CSV still has it [default: Churn]")
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("output_file")
                .short('o')
                .long("output")
                .help("Path to write predictions (CSV). Defaults to stdout.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail instead of zero-filling when encoded columns differ from training")
                .action(ArgAction::SetTrue),
        )
}

impl PredictConfig {
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut config = PredictConfig::default();

        if let Some(csv) = matches.get_one::<PathBuf>("csv") {
            config.csv = csv.clone();
        }
        validate_csv_file(&config.csv)?;

        if let Some(model_dir) = matches.get_one::<PathBuf>("model_dir") {
            config.model_dir = model_dir.clone();
        }
        if let Some(target) = matches.get_one::<String>("target") {
            config.target_column = target.clone();
        }
        config.output = matches.get_one::<PathBuf>("output_file").cloned();
        config.strict = matches.get_flag("strict");

        Ok(config)
    }
}
