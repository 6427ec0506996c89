use std::path::Path;

use log::debug;
use plotters::prelude::*;
use thiserror::Error;

use crate::histogram::FinalHistogram;

/// Size of the plot in pixels
pub const PLOT_SIZE: (u32, u32) = (800, 600);

const Y_MIN: f64 = 0.5;

#[derive(Debug, Error)]
#[error("Failed to draw histogram: {0}")]
pub struct PlotError(String);

/// Draw `hist` as an SVG file with a logarithmic y axis
///
/// Each nonzero bin is drawn as a marker at the bin centre with its
/// Poisson uncertainty.
pub fn plot_histogram(hist: &FinalHistogram, path: &Path) -> Result<(), PlotError> {
    debug!("Plotting {} to {path:?}", hist.labels.name);
    draw(hist, path).map_err(|err| PlotError(err.to_string()))
}

fn draw(
    hist: &FinalHistogram,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let x_min = hist.edges.first().copied().unwrap_or_default();
    let x_max = hist.edges.last().copied().unwrap_or(x_min + 1.);
    let y_max = 10. * (hist.max_count().max(1) as f64);

    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&hist.labels.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (Y_MIN..y_max).log_scale())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(hist.labels.x_axis.as_str())
        .y_desc(hist.labels.y_axis.as_str())
        .draw()?;

    let points: Vec<_> = hist
        .centres()
        .zip(hist.bins.iter().zip(hist.errors.iter()))
        .filter(|(_, (&n, _))| n > 0)
        .map(|(x, (&n, &err))| (x, n as f64, err))
        .collect();

    chart.draw_series(points.iter().map(|&(x, y, err)| {
        ErrorBar::new_vertical(x, (y - err).max(Y_MIN), y, y + err, BLACK.filled(), 6)
    }))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y, _)| Circle::new((x, y), 3, BLACK.filled())),
    )?;

    root.present()?;
    Ok(())
}
