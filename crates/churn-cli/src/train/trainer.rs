use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use churn_classifiers::io::{load_telco_csv, save_artifacts, ArtifactPaths, ModelMetadata};
use churn_classifiers::models::{build_model, ClassifierModel, LogisticRegression, ModelKind};
use churn_classifiers::preprocessing::{clean_telco, make_xy, one_hot_encode, to_matrix};
use churn_classifiers::report::{
    format_coefficients, plot_precision_recall, report, top_coefficients,
    write_precision_recall_plot,
};
use churn_classifiers::split::stratified_split;
use churn_classifiers::stats::{
    apply_threshold, choose_threshold_for_recall_and_precision, precision_recall_by_threshold,
    ThresholdChoice,
};

use crate::train::input::TrainConfig;
use crate::util::resolve_dir;

const TOP_COEFFICIENTS: usize = 15;
const PLOT_FILE: &str = "precision_recall.html";

/// What a training run produced.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub artifacts: ArtifactPaths,
    pub output_directory: PathBuf,
    pub threshold: ThresholdChoice,
    pub feature_columns: Vec<String>,
    pub plot: Option<PathBuf>,
}

/// Run the full pipeline, printing reports to stdout.
pub fn run_training(config: &TrainConfig) -> Result<TrainingSummary> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_training_with_output(config, &mut out)
}

pub fn run_training_with_output<W: Write>(config: &TrainConfig, out: &mut W) -> Result<TrainingSummary> {
    let pipeline = &config.pipeline;

    let table = load_telco_csv(&config.csv)
        .with_context(|| format!("Failed to load {}", config.csv.display()))?;
    log::info!(
        "Loaded {} rows x {} columns",
        table.nrows(),
        table.headers.len()
    );

    let (x, y) = make_xy(&table, &pipeline.target_column)?;
    let (x, y) = clean_telco(x, y)?;
    let encoded = one_hot_encode(&x, true);
    let feature_columns = encoded.column_names().to_vec();
    let matrix = to_matrix(&encoded)?;
    log::info!(
        "Encoded {} rows into {} feature columns",
        matrix.nrows(),
        matrix.ncols()
    );

    let split = stratified_split(&matrix, &y, pipeline.test_size, pipeline.random_seed)
        .context("Failed to split data")?;
    log::info!(
        "Split into {} train / {} test rows (seed {})",
        split.y_train.len(),
        split.y_test.len(),
        pipeline.random_seed
    );

    // Baseline
    let mut baseline = build_model(ModelKind::Baseline, &pipeline.model);
    baseline.fit(&split.x_train, &split.y_train)?;
    let y_base = baseline.predict(&split.x_test)?;
    writeln!(out, "\n=== Baseline (most_frequent) ===")?;
    write!(out, "{}", report(&split.y_test, &y_base)?)?;

    // Logistic regression at the default cut-off
    log::info!("Fitting logistic regression (C={})", pipeline.model.c);
    let mut model = LogisticRegression::new(pipeline.model.clone());
    model
        .fit(&split.x_train, &split.y_train)
        .context("Logistic regression fit failed")?;
    log::debug!(
        "Fit finished after {} iterations (converged: {})",
        model.n_iter,
        model.converged
    );
    let y_pred = model.predict(&split.x_test)?;
    writeln!(out, "\n=== Logistic Regression @ threshold=0.5 ===")?;
    write!(out, "{}", report(&split.y_test, &y_pred)?)?;

    // Threshold tuning
    let y_proba = model.predict_proba(&split.x_test)?;
    let pr_table = precision_recall_by_threshold(&split.y_test, &y_proba)?;
    let choice = choose_threshold_for_recall_and_precision(
        &pr_table,
        pipeline.min_recall,
        pipeline.min_precision,
        pipeline.threshold_strategy,
    )?;
    let y_custom = apply_threshold(&y_proba, choice.threshold());
    writeln!(
        out,
        "\n=== Logistic Regression @ chosen_threshold={:.4} (min_recall={}, min_precision={}, strategy={}, {}) ===",
        choice.threshold(),
        pipeline.min_recall,
        pipeline.min_precision,
        pipeline.threshold_strategy,
        if choice.is_fallback() {
            "constraints not met, max-F1 fallback"
        } else {
            "constraints satisfied"
        }
    )?;
    write!(out, "{}", report(&split.y_test, &y_custom)?)?;

    // Coefficients
    let top = top_coefficients(&model, &feature_columns, TOP_COEFFICIENTS)?;
    writeln!(out, "\n=== Top coefficients (by |coef|) ===")?;
    write!(out, "{}", format_coefficients(&top))?;

    // Save artifacts
    let metadata = ModelMetadata::new(
        choice,
        pipeline.min_recall,
        pipeline.min_precision,
        pipeline.threshold_strategy,
        feature_columns.clone(),
    );
    let artifacts = save_artifacts(&pipeline.output_directory, &model, &metadata)
        .with_context(|| {
            format!(
                "Failed to write artifacts to {}",
                pipeline.output_directory.display()
            )
        })?;

    let plot = if config.plot {
        let path = pipeline.output_directory.join(PLOT_FILE);
        let figure = plot_precision_recall(&pr_table, Some(&choice), "Precision / recall by threshold");
        write_precision_recall_plot(&figure, &path)?;
        Some(path)
    } else {
        None
    };

    let output_directory = resolve_dir(&pipeline.output_directory)?;
    writeln!(out, "\nSaved model + metadata to: {}", output_directory.display())?;

    Ok(TrainingSummary {
        artifacts,
        output_directory,
        threshold: choice,
        feature_columns,
        plot,
    })
}
