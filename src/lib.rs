pub mod config;
pub mod error;
pub mod matrix;
pub mod output;
#[cfg(feature = "plot")]
pub mod plot;
pub mod ray;
pub mod result;
pub mod sampler;
pub mod settings;
pub mod simulation;
pub mod system;
pub mod validate;

pub use error::{CloakError, Result};
pub use matrix::{lens_matrix, translation_matrix, AbcdMatrix};
pub use ray::{propagate, propagate_through_system, Ray, Trajectory, TrajectoryPoint};
pub use sampler::{sample_fan, sample_fan_with_progress, sample_rays, RaySample};
pub use system::{build_system, compose_matrix, CloakConfiguration, OpticalElement, OpticalSystem};
pub use validate::{validate, ValidationResult, Validator};
