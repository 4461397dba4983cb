//! PNG rendering of a traced ray fan.
//!
//! Draws the four lens planes as dashed verticals, shades the cloaked region
//! between the inner lenses, and plots every ray path coloured by entrance
//! height. Only compiled with the `plot` feature.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use plotters::prelude::*;
use tracing::info;

use crate::{sampler::RaySample, system::CloakConfiguration};

const FIGURE_SIZE: (u32, u32) = (1500, 900);
const Y_LIMIT: f64 = 30.0; // mm
const LENS_LABELS: [&str; 4] = ["L1 (f1)", "L2 (f2)", "L3 (f2)", "L4 (f1)"];

/// Colour of the ray entering at `height`, from the fan's height span.
fn ray_color(height: f64, min: f64, max: f64) -> HSLColor {
    let t = if max > min {
        (height - min) / (max - min)
    } else {
        0.5
    };
    HSLColor(0.75 - 0.5 * t, 0.7, 0.4)
}

/// Render `samples` over the cloak geometry to `directory/ray_paths.png`.
pub fn plot_rays(
    config: &CloakConfiguration,
    samples: &[RaySample],
    directory: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join("ray_paths.png");
    draw(config, samples, &path)?;

    info!("Figure saved as {:?}", path);
    Ok(path)
}

fn draw(config: &CloakConfiguration, samples: &[RaySample], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("{e}"))?;

    let z_end = samples
        .iter()
        .map(|s| s.trajectory.final_z())
        .fold(config.total_length(), f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Ray trajectories through the Rochester Cloak",
            ("sans-serif", 30).into_font(),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-10.0..z_end + 10.0, -Y_LIMIT..Y_LIMIT)
        .map_err(|e| anyhow!("{e}"))?;

    chart
        .configure_mesh()
        .x_desc("Axial position (mm)")
        .y_desc("Height (mm)")
        .axis_desc_style(("sans-serif", 20))
        .draw()
        .map_err(|e| anyhow!("{e}"))?;

    // cloaked region between the inner lenses
    let (start, stop) = config.cloaked_region();
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(start, -Y_LIMIT), (stop, Y_LIMIT)],
            RGBColor(211, 211, 211).mix(0.3).filled(),
        )))
        .map_err(|e| anyhow!("{e}"))?
        .label("Cloaked region (approx.)")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], RGBColor(211, 211, 211).filled()));

    // optical axis
    chart
        .draw_series(LineSeries::new(
            vec![(-10.0, 0.0), (z_end + 10.0, 0.0)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| anyhow!("{e}"))?;

    for (z, label) in config.lens_positions().into_iter().zip(LENS_LABELS) {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(z, -Y_LIMIT), (z, Y_LIMIT)],
                6,
                4,
                BLACK.mix(0.7).stroke_width(1),
            ))
            .map_err(|e| anyhow!("{e}"))?;
        chart
            .draw_series(std::iter::once(Text::new(
                label.to_string(),
                (z, 0.95 * Y_LIMIT),
                ("sans-serif", 16).into_font(),
            )))
            .map_err(|e| anyhow!("{e}"))?;
    }

    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.height), hi.max(s.height))
        });
    for sample in samples {
        let color = ray_color(sample.height, min, max);
        let points: Vec<(f64, f64)> = sample.trajectory.z().zip(sample.trajectory.y()).collect();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(|e| anyhow!("{e}"))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| anyhow!("{e}"))?;

    let params = format!(
        "f1 = {:.0} mm, f2 = {:.0} mm | t1 = {:.0} mm, t2 = {:.0} mm | L = {:.0} mm",
        config.f1(),
        config.f2(),
        config.t1(),
        config.t2(),
        config.total_length()
    );
    root.draw(&Text::new(
        params,
        (80, FIGURE_SIZE.1 as i32 - 30),
        ("sans-serif", 16).into_font(),
    ))
    .map_err(|e| anyhow!("{e}"))?;

    root.present().map_err(|e| anyhow!("{e}"))?;
    Ok(())
}
