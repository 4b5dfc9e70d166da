use std::path::Path;

use churn_classifiers::config::PipelineConfig;
use churn_classifiers::error::ChurnError;
use churn_classifiers::io::load_metadata;
use churn_cli::predict::inference::run_inference;
use churn_cli::predict::input::PredictConfig;
use churn_cli::train::input::TrainConfig;
use churn_cli::train::trainer::run_training_with_output;

fn write_csv(path: &Path) {
    let mut text = String::from("customerID,tenure,Contract,TotalCharges,Churn\n");
    let contracts = ["Month-to-month", "One year", "Two year"];
    for i in 0..120usize {
        let tenure = (i * 5) % 60 + 1;
        let contract = contracts[i % 3];
        let churn = if contract == "Month-to-month" && tenure < 25 { "Yes" } else { "No" };
        text.push_str(&format!(
            "c{},{},{},{:.1},{}\n",
            i,
            tenure,
            contract,
            tenure as f64 * 50.0,
            churn
        ));
    }
    std::fs::write(path, text).unwrap();
}

fn train(dir: &Path) -> (TrainConfig, String) {
    let csv = dir.join("telco.csv");
    write_csv(&csv);
    let config = TrainConfig {
        csv,
        pipeline: PipelineConfig {
            output_directory: dir.join("models"),
            ..PipelineConfig::default()
        },
        plot: false,
    };
    let mut out = Vec::new();
    run_training_with_output(&config, &mut out).unwrap();
    (config, String::from_utf8(out).unwrap())
}

#[test]
fn training_summary_pins_feature_columns() {
    let dir = tempfile::tempdir().unwrap();
    let (config, printed) = train(dir.path());

    assert!(printed.contains("strategy=first"));
    assert!(printed.contains("accuracy"));

    let metadata = load_metadata(&config.pipeline.output_directory).unwrap();
    assert_eq!(
        metadata.feature_columns,
        vec![
            "tenure".to_string(),
            "TotalCharges".to_string(),
            "Contract_One year".to_string(),
            "Contract_Two year".to_string(),
        ]
    );
}

#[test]
fn strict_prediction_rejects_missing_columns() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = train(dir.path());

    // Contract only ever "Two year": "Contract_One year" cannot be produced.
    let new_csv = dir.path().join("new.csv");
    std::fs::write(
        &new_csv,
        "customerID,tenure,Contract,TotalCharges\nx1,3,Two year,150.0\nx2,40,Two year,2000.0\n",
    )
    .unwrap();

    let mut predict = PredictConfig {
        csv: new_csv,
        model_dir: config.pipeline.output_directory.clone(),
        output: Some(dir.path().join("scored.csv")),
        strict: true,
        ..PredictConfig::default()
    };
    let err = run_inference(&predict).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ChurnError>(),
        Some(ChurnError::FeatureSchemaMismatch { .. })
    ));

    predict.strict = false;
    let rows = run_inference(&predict).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| (0.0..=1.0).contains(&r.probability)));
    assert_eq!(rows[0].customer_id, "x1");
}
