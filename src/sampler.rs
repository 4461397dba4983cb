//! Representative ray bundles for plotting.
//!
//! [`sample_rays`] traces one ray per requested entrance height at a common
//! angle. [`sample_fan`] traces the full grid of heights and angles and
//! continues every ray a short distance past the last lens so its exit
//! direction is visible.
//!
//! The system is built once per call and every ray is independent, so fans
//! are traced in parallel. Results always come back in input order, and the
//! same inputs always give the same trajectories.

use itertools::Itertools;
use ndarray::Array1;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::Result,
    ray::{propagate_through_system, Ray, Trajectory},
    system::{build_system, CloakConfiguration, OpticalSystem},
};


/// A traced input ray.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaySample {
    pub height: f64, // entrance height (mm)
    pub angle: f64,  // entrance angle (rad)
    pub trajectory: Trajectory,
}

/// Traces one ray per entrance height at a common `angle`.
///
/// Returns the samples in the order of `heights`.
pub fn sample_rays(
    config: &CloakConfiguration,
    heights: &[f64],
    angle: f64,
) -> Result<Vec<RaySample>> {
    let system = build_system(config.f1(), config.f2())?;
    Ok(heights
        .iter()
        .map(|&height| RaySample {
            height,
            angle,
            trajectory: propagate_through_system(&Ray::new(height, angle), &system),
        })
        .collect())
}

/// Looks up the sample traced from `height`.
pub fn find(samples: &[RaySample], height: f64) -> Option<&RaySample> {
    samples.iter().find(|s| s.height == height)
}

/// Every `(height, angle)` pair of a fan, heights outermost.
fn fan_inputs(heights: &[f64], angles: &[f64]) -> Vec<(f64, f64)> {
    heights
        .iter()
        .copied()
        .cartesian_product(angles.iter().copied())
        .collect()
}

/// Traces a single fan member and extends it `exit_extension` mm past the
/// end of `system`.
fn trace(
    system: &OpticalSystem,
    height: f64,
    angle: f64,
    exit_extension: f64,
) -> Result<RaySample> {
    let mut trajectory = propagate_through_system(&Ray::new(height, angle), system);
    if exit_extension != 0.0 {
        trajectory = trajectory.extended(exit_extension)?;
    }
    Ok(RaySample {
        height,
        angle,
        trajectory,
    })
}

/// Traces every combination of `heights` and `angles` in parallel.
pub fn sample_fan(
    config: &CloakConfiguration,
    heights: &[f64],
    angles: &[f64],
    exit_extension: f64,
) -> Result<Vec<RaySample>> {
    sample_fan_with_progress(config, heights, angles, exit_extension, || {})
}

/// [`sample_fan`], calling `on_ray` once for every traced ray.
///
/// `on_ray` runs on the rayon worker threads, in no particular order.
pub fn sample_fan_with_progress<F>(
    config: &CloakConfiguration,
    heights: &[f64],
    angles: &[f64],
    exit_extension: f64,
    on_ray: F,
) -> Result<Vec<RaySample>>
where
    F: Fn() + Sync,
{
    let system = build_system(config.f1(), config.f2())?;
    let inputs = fan_inputs(heights, angles);
    debug!(rays = inputs.len(), "tracing ray fan");

    inputs
        .par_iter()
        .map(|&(height, angle)| {
            let sample = trace(&system, height, angle, exit_extension);
            on_ray();
            sample
        })
        .collect()
}

/// `num` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    Array1::linspace(start, stop, num).to_vec()
}
