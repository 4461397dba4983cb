//! Error kinds raised by the ray-transfer core.
//!
//! Every failure is detected synchronously where the bad value enters the
//! computation and is handed back to the caller unchanged. There are no
//! transient failures in closed-form 2x2 algebra, so nothing here is retried.

use thiserror::Error;

/// Failures of the paraxial core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CloakError {
    /// A non-physical scalar, such as a zero focal length or a negative distance.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A degenerate cloak configuration.
    #[error("invalid cloak configuration (f1 = {f1}, f2 = {f2}): {reason}")]
    InvalidConfiguration {
        f1: f64,
        f2: f64,
        reason: &'static str,
    },

    /// A composed matrix whose determinant drifted away from 1. This points to
    /// a construction bug, not to bad user input.
    #[error("numeric anomaly: determinant = {determinant:.12e}, deviation {deviation:.3e} exceeds {tolerance:.1e}")]
    NumericAnomaly {
        determinant: f64,
        deviation: f64,
        tolerance: f64,
    },
}

pub type Result<T> = std::result::Result<T, CloakError>;
