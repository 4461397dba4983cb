//! End-to-end cloak simulation.
//!
//! A [`Simulation`] owns the runtime settings and carries one configuration
//! from focal lengths to written output:
//! - builds and composes the four-lens system
//! - validates the cloaking conditions
//! - pushes the example ray through the composite matrix
//! - traces the ray fan in parallel with a progress bar
//! - writes trajectories, results and the optional figure

use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::{
    output,
    ray::propagate,
    result::{CloakResult, ExampleRay},
    sampler,
    settings::Settings,
    system::{build_system, compose_matrix},
    validate::Validator,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::load_default_config;

    #[test]
    fn default_run_is_cloak() {
        let settings = load_default_config().unwrap();
        let mut simulation = Simulation::new(settings).unwrap();
        simulation.solve().unwrap();

        let result = simulation.result.as_ref().unwrap();
        assert!(result.validation.is_cloak());
        assert_eq!(result.samples.len(), 9 * 3);
        assert!((result.example.lateral_shift() - 8.8).abs() < 1e-9);
        assert!(result.example.angle_change().abs() < 1e-12);
        assert_eq!(result.non_finite_samples().count(), 0);
    }

    #[test]
    fn writeup_before_solve_fails() {
        let settings = load_default_config().unwrap();
        let simulation = Simulation::new(settings).unwrap();
        assert!(simulation.writeup().is_err());
    }
}

/// A configured cloak run.
///
/// **Context**: The command line, the config file and the environment all end
/// up in one [`Settings`]. The simulation turns those settings into a
/// [`CloakResult`] and hands it to the output writers.
///
/// **How it Works**: `new` checks the focal lengths up front so a bad
/// configuration fails before any work is done. `solve` computes everything
/// and keeps the result; `writeup` persists it.
#[derive(Debug)]
pub struct Simulation {
    pub settings: Settings,
    pub result: Option<CloakResult>,
}

impl Simulation {
    pub fn new(settings: Settings) -> Result<Self> {
        settings
            .cloak_configuration()
            .context("Invalid cloak configuration")?;
        Ok(Self {
            settings,
            result: None,
        })
    }

    /// Computes the system matrix, validation, example ray and ray fan.
    pub fn solve(&mut self) -> Result<()> {
        let start = Instant::now();
        info!("Solving cloak...");

        let configuration = self.settings.cloak_configuration()?;
        let system = build_system(configuration.f1(), configuration.f2())?;
        let matrix = compose_matrix(&system)?;

        let validation = Validator::new(self.settings.tolerance).validate(
            &matrix,
            configuration.t1(),
            configuration.t2(),
            self.settings.refractive_index,
        );

        let input = self.settings.example_ray;
        let example = ExampleRay {
            input,
            output: propagate(&input, &matrix),
        };

        let heights = self.settings.heights.values();
        let angles = &self.settings.angles;

        let pb = ProgressBar::new((heights.len() * angles.len()) as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg}",
            )?
            .progress_chars("█▇▆▅▄▃▂▁"),
        );
        pb.set_message("rays".to_string());

        let samples = sampler::sample_fan_with_progress(
            &configuration,
            &heights,
            angles,
            self.settings.exit_extension,
            || pb.inc(1),
        )?;
        pb.finish_and_clear();

        let result = CloakResult {
            configuration,
            refractive_index: self.settings.refractive_index,
            matrix,
            validation,
            example,
            samples,
        };

        for sample in result.non_finite_samples() {
            warn!(
                height = sample.height,
                angle = sample.angle,
                "trajectory contains non-finite values"
            );
        }

        info!(
            "Time taken: {:.2?} for {} rays",
            start.elapsed(),
            result.samples.len()
        );
        println!("{}", result);

        self.result = Some(result);
        Ok(())
    }

    /// Writes the solved result to the configured output directory.
    pub fn writeup(&self) -> Result<()> {
        let result = self
            .result
            .as_ref()
            .context("Nothing to write: the simulation has not been solved")?;
        let directory = &self.settings.directory;

        output::write_trajectories(&result.samples, directory)?;
        output::write_result(result, directory)?;
        output::write_summary(result, directory)?;

        if self.settings.plot {
            self.plot(result)?;
        }
        Ok(())
    }

    #[cfg(feature = "plot")]
    fn plot(&self, result: &CloakResult) -> Result<()> {
        crate::plot::plot_rays(&result.configuration, &result.samples, &self.settings.directory)?;
        Ok(())
    }

    #[cfg(not(feature = "plot"))]
    fn plot(&self, _result: &CloakResult) -> Result<()> {
        warn!("Plot requested but the `plot` feature is not enabled; skipping figure");
        Ok(())
    }
}
