use anyhow::Result;
use clap::{ArgMatches, Command};
use log::LevelFilter;

use churn_cli::predict::inference;
use churn_cli::predict::input::{predict_command, PredictConfig};
use churn_cli::train::input::{train_command, TrainConfig};
use churn_cli::train::trainer;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CHURN_LOG", "error,churn=info"))
        .init();

    let matches = Command::new("churn")
        .version(clap::crate_version!())
        .about("Customer churn prediction with a threshold-tuned logistic regression")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(train_command())
        .subcommand(predict_command())
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let params = match TrainConfig::from_arguments(matches) {
        Ok(params) => params,
        Err(e) => {
            log::error!("Invalid training arguments: {:#}", e);
            std::process::exit(1)
        }
    };
    log::info!("[Churn::Train] Training from {:?}", params.csv);

    match trainer::run_training(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let params = match PredictConfig::from_arguments(matches) {
        Ok(params) => params,
        Err(e) => {
            log::error!("Invalid prediction arguments: {:#}", e);
            std::process::exit(1)
        }
    };
    log::info!(
        "[Churn::Predict] Scoring {:?} with model from {:?}",
        params.csv,
        params.model_dir
    );

    match inference::run_inference(&params) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
