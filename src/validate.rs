//! Cloaking-condition checks on a system matrix.
//!
//! A paraxial cloak must leave every ray as it would be after travelling the
//! same length through the surrounding medium. For the system matrix
//! `[[A, B], [C, D]]` this means:
//! - `C = 0`, the system is afocal
//! - `A = 1`, unity magnification
//! - `B = L / n`, the lateral shift of empty space of length `L = 2 t1 + t2`
//!
//! Validation never fails. It reports each condition and the measured
//! deviation so that non-ideal configurations can be described rather than
//! rejected.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{config::VALIDATION_TOLERANCE, matrix::AbcdMatrix};


/// Outcome of a cloaking-condition check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_afocal: bool,
    pub is_unity_magnification: bool,
    pub lateral_shift_ok: bool,
    pub a_deviation: f64, // |A - 1|
    pub c_deviation: f64, // |C|
    pub b_deviation: f64, // |B - L/n|
    pub expected_shift: f64,
    pub tolerance: f64,
}

impl ValidationResult {
    /// All three conditions hold.
    pub fn is_cloak(&self) -> bool {
        self.is_afocal && self.is_unity_magnification && self.lateral_shift_ok
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cloak conditions (tolerance {:.1e}):", self.tolerance)?;
        writeln!(
            f,
            "  Afocal (C = 0):          {:<5} |C| = {:.3e}",
            self.is_afocal, self.c_deviation
        )?;
        writeln!(
            f,
            "  Unity mag. (A = 1):      {:<5} |A - 1| = {:.3e}",
            self.is_unity_magnification, self.a_deviation
        )?;
        writeln!(
            f,
            "  Lateral shift (B = L/n): {:<5} |B - {:.3}| = {:.3e}",
            self.lateral_shift_ok, self.expected_shift, self.b_deviation
        )?;
        write!(f, "  Perfect paraxial cloak:  {}", self.is_cloak())
    }
}

/// Checks matrices against the cloaking conditions with tolerance `epsilon`.
///
/// `epsilon` applies directly to the dimensionless entries A and C. For B it
/// is scaled by the expected shift (never below 1 mm), so long systems are
/// not held to a sub-nanometre absolute bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validator {
    pub epsilon: f64,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            epsilon: VALIDATION_TOLERANCE,
        }
    }
}

impl Validator {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn validate(
        &self,
        matrix: &AbcdMatrix,
        t1: f64,
        t2: f64,
        refractive_index: f64,
    ) -> ValidationResult {
        let expected_shift = (2.0 * t1 + t2) / refractive_index;
        let a_deviation = (matrix.a() - 1.0).abs();
        let c_deviation = matrix.c().abs();
        let b_deviation = (matrix.b() - expected_shift).abs();
        let b_tolerance = self.epsilon * expected_shift.abs().max(1.0);

        let result = ValidationResult {
            is_afocal: c_deviation < self.epsilon,
            is_unity_magnification: a_deviation < self.epsilon,
            lateral_shift_ok: b_deviation < b_tolerance,
            a_deviation,
            c_deviation,
            b_deviation,
            expected_shift,
            tolerance: self.epsilon,
        };

        if result.is_cloak() {
            debug!(expected_shift, "cloak conditions satisfied");
        } else {
            warn!(
                afocal = result.is_afocal,
                unity = result.is_unity_magnification,
                shift = result.lateral_shift_ok,
                "cloak conditions not satisfied"
            );
        }
        result
    }
}

/// Validates with the default tolerance.
pub fn validate(matrix: &AbcdMatrix, t1: f64, t2: f64, refractive_index: f64) -> ValidationResult {
    Validator::default().validate(matrix, t1, t2, refractive_index)
}
