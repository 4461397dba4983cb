use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::{result::CloakResult, sampler::RaySample, validate::ValidationResult};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::sample_fan;
    use crate::system::CloakConfiguration;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cloak_output_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn trajectories_one_line_per_point() {
        let config = CloakConfiguration::new(200.0, 75.0).unwrap();
        let samples = sample_fan(&config, &[-5.0, 5.0], &[0.0], 50.0).unwrap();
        let dir = scratch_dir("traj");

        let path = write_trajectories(&samples, &dir).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<_> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(lines.len(), 2 * 9);

        let fields: Vec<f64> = lines[0]
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(fields, vec![-5.0, 0.0, 0.0, -5.0, 0.0]);

        let _ = fs::remove_dir_all(&dir);
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    f1: f64,
    f2: f64,
    t1: f64,
    t2: f64,
    total_length: f64,
    refractive_index: f64,
    matrix: MatrixEntries,
    validation: &'a ValidationResult,
}

#[derive(Serialize)]
struct MatrixEntries {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

fn create_output(directory: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {:?}", directory))?;
    let path = directory.join(name);
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    Ok((path, BufWriter::new(file)))
}

/// Write every trajectory point as `height angle z y theta`, one per line.
pub fn write_trajectories(samples: &[RaySample], directory: &Path) -> Result<PathBuf> {
    let (path, mut writer) = create_output(directory, "trajectories")?;

    writeln!(writer, "# height angle z y theta")?;
    for sample in samples {
        for point in sample.trajectory.points() {
            writeln!(
                writer,
                "{} {} {} {} {}",
                sample.height, sample.angle, point.z, point.ray.y, point.ray.theta
            )?;
        }
    }
    writer.flush()?;

    info!("Trajectories written to {:?}", path);
    Ok(path)
}

/// Write the full result as JSON.
pub fn write_result(result: &CloakResult, directory: &Path) -> Result<PathBuf> {
    let (path, writer) = create_output(directory, "results.json")?;
    serde_json::to_writer_pretty(writer, result).context("Failed to serialize results")?;

    info!("Results written to {:?}", path);
    Ok(path)
}

/// Write the configuration, system matrix and validation outcome as TOML.
pub fn write_summary(result: &CloakResult, directory: &Path) -> Result<PathBuf> {
    let config = &result.configuration;
    let summary = Summary {
        f1: config.f1(),
        f2: config.f2(),
        t1: config.t1(),
        t2: config.t2(),
        total_length: config.total_length(),
        refractive_index: result.refractive_index,
        matrix: MatrixEntries {
            a: result.matrix.a(),
            b: result.matrix.b(),
            c: result.matrix.c(),
            d: result.matrix.d(),
        },
        validation: &result.validation,
    };
    let text = toml::to_string_pretty(&summary).context("Failed to serialize summary")?;

    let (path, mut writer) = create_output(directory, "summary.toml")?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;

    info!("Summary written to {:?}", path);
    Ok(path)
}
