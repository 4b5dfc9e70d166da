use std::path::Path;

use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};

use crate::error::Result;
use crate::stats::{PrecisionRecallRow, ThresholdChoice};

/// Precision and recall against threshold, with the chosen operating point
/// drawn as a dashed vertical line.
///
/// # Arguments
///
/// * `table` - Threshold sweep, in increasing threshold order.
/// * `choice` - Operating threshold to mark, if any.
/// * `title` - The title of the plot
pub fn plot_precision_recall(
    table: &[PrecisionRecallRow],
    choice: Option<&ThresholdChoice>,
    title: &str,
) -> Plot {
    let thresholds: Vec<f64> = table.iter().map(|r| r.threshold).collect();
    let precision: Vec<f64> = table.iter().map(|r| r.precision).collect();
    let recall: Vec<f64> = table.iter().map(|r| r.recall).collect();

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(thresholds.clone(), precision)
            .mode(Mode::Lines)
            .name("Precision"),
    );
    plot.add_trace(
        Scatter::new(thresholds, recall)
            .mode(Mode::Lines)
            .name("Recall"),
    );

    if let Some(choice) = choice {
        let t = choice.threshold();
        let label = if choice.is_fallback() {
            format!("Threshold {:.3} (max-F1 fallback)", t)
        } else {
            format!("Threshold {:.3}", t)
        };
        plot.add_trace(
            Scatter::new(vec![t, t], vec![0.0, 1.0])
                .mode(Mode::Lines)
                .name(label.as_str())
                .line(Line::new().color("red").dash(DashType::Dash)),
        );
    }

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Threshold"))
            .y_axis(Axis::new().title("Score")),
    );
    plot
}

/// Write `plot` as a standalone HTML page.
pub fn write_precision_recall_plot(plot: &Plot, path: &Path) -> Result<()> {
    std::fs::write(path, plot.to_html())?;
    log::info!("Wrote precision-recall plot to {}", path.display());
    Ok(())
}
