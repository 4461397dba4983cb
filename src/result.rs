use std::fmt;

use serde::Serialize;

use crate::{
    matrix::AbcdMatrix,
    ray::Ray,
    sampler::RaySample,
    system::CloakConfiguration,
    validate::ValidationResult,
};

/// A single ray pushed through the composite matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExampleRay {
    pub input: Ray,
    pub output: Ray,
}

impl ExampleRay {
    pub fn angle_change(&self) -> f64 {
        self.output.theta - self.input.theta
    }

    pub fn lateral_shift(&self) -> f64 {
        self.output.y - self.input.y
    }
}

/// Everything computed for one cloak configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloakResult {
    pub configuration: CloakConfiguration,
    pub refractive_index: f64,
    pub matrix: AbcdMatrix,
    pub validation: ValidationResult,
    pub example: ExampleRay,
    pub samples: Vec<RaySample>,
}

impl CloakResult {
    /// Rays whose trajectory contains a non-finite component.
    pub fn non_finite_samples(&self) -> impl Iterator<Item = &RaySample> {
        self.samples
            .iter()
            .filter(|s| s.trajectory.points().iter().any(|p| !p.ray.is_finite()))
    }
}

impl fmt::Display for CloakResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = &self.configuration;
        writeln!(f, "Rochester Cloak")?;
        writeln!(f, "  Focal lengths: f1 = {} mm, f2 = {} mm", config.f1(), config.f2())?;
        writeln!(
            f,
            "  Separations:   t1 = {:.1} mm, t2 = {:.1} mm",
            config.t1(),
            config.t2()
        )?;
        writeln!(f, "  Total length:  L = {:.1} mm", config.total_length())?;
        writeln!(f, "Total ABCD matrix:")?;
        writeln!(f, "{}", self.matrix)?;
        writeln!(f, "{}", self.validation)?;
        writeln!(
            f,
            "Ray entering at y = {} mm, θ = {} rad",
            self.example.input.y, self.example.input.theta
        )?;
        writeln!(
            f,
            "Ray exits at   y = {:.3} mm, θ = {:.6} rad",
            self.example.output.y, self.example.output.theta
        )?;
        writeln!(f, "  Angle change (θ_out - θ_in) = {:.6} rad", self.example.angle_change())?;
        write!(f, "  Lateral shift (y_out - y_in) = {:.3} mm", self.example.lateral_shift())
    }
}
