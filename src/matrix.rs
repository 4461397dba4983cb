//! Elementary ray-transfer matrices of paraxial optics.
//!
//! A paraxial ray in the meridional plane is the column vector `[y, theta]`.
//! Each optical element acts on it through a 2x2 ABCD matrix:
//!
//! ```text
//! | y' |   | A  B | | y |
//! | θ' | = | C  D | | θ |
//! ```
//!
//! This module provides:
//! - [`AbcdMatrix`], a thin wrapper over `nalgebra::Matrix2<f64>`
//! - [`lens_matrix`] for a thin lens of focal length `f`
//! - [`translation_matrix`] for free-space propagation over a distance `d`
//!
//! Both constructors reject non-physical input with
//! [`CloakError::InvalidParameter`]. Every matrix they return has unit
//! determinant.

use std::{fmt, ops::Mul};

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

use crate::error::{CloakError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lens_has_unit_determinant() {
        for f in [1e-3, 0.5, 75.0, 200.0, 1e6, -120.0] {
            let m = lens_matrix(f).unwrap();
            assert!((m.determinant() - 1.0).abs() < f64::EPSILON, "f = {}", f);
        }
    }

    #[test]
    fn translation_has_unit_determinant() {
        for d in [0.0, 1e-3, 275.0, 330.0, 1e6] {
            let m = translation_matrix(d).unwrap();
            assert!((m.determinant() - 1.0).abs() < f64::EPSILON, "d = {}", d);
        }
    }

    #[test]
    fn lens_entries() {
        let m = lens_matrix(200.0).unwrap();
        assert_eq!(m.a(), 1.0);
        assert_eq!(m.b(), 0.0);
        assert_eq!(m.c(), -1.0 / 200.0);
        assert_eq!(m.d(), 1.0);
    }

    #[test]
    fn translation_entries() {
        let m = translation_matrix(275.0).unwrap();
        assert_eq!(m.a(), 1.0);
        assert_eq!(m.b(), 275.0);
        assert_eq!(m.c(), 0.0);
        assert_eq!(m.d(), 1.0);
    }

    #[test]
    fn zero_focal_length_rejected() {
        assert!(matches!(
            lens_matrix(0.0),
            Err(CloakError::InvalidParameter { name: "focal_length", .. })
        ));
        assert!(lens_matrix(f64::NAN).is_err());
    }

    #[test]
    fn negative_distance_rejected() {
        assert!(matches!(
            translation_matrix(-1.0),
            Err(CloakError::InvalidParameter { name: "distance", .. })
        ));
        assert!(translation_matrix(f64::INFINITY).is_err());
    }

    #[test]
    fn determinant_scale_sums_both_products() {
        let m = AbcdMatrix::new(2.0, 3.0, -4.0, 5.0);
        assert_eq!(m.determinant_scale(), 22.0);
        assert_eq!(AbcdMatrix::identity().determinant_scale(), 1.0);
    }

    #[test]
    fn product_applies_right_operand_first() {
        // a lens followed by 100mm of free space
        let lens = lens_matrix(100.0).unwrap();
        let gap = translation_matrix(100.0).unwrap();
        let m = gap * lens;
        // a collimated ray is focused onto the axis
        assert!(m.a().abs() < 1e-12);
        assert_eq!(m.b(), 100.0);
        assert_eq!(m.c(), -0.01);
    }
}

/// A 2x2 ray-transfer matrix `[[A, B], [C, D]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbcdMatrix(Matrix2<f64>);

impl AbcdMatrix {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self(Matrix2::new(a, b, c, d))
    }

    pub fn identity() -> Self {
        Self(Matrix2::identity())
    }

    pub fn a(&self) -> f64 {
        self.0[(0, 0)]
    }

    pub fn b(&self) -> f64 {
        self.0[(0, 1)]
    }

    pub fn c(&self) -> f64 {
        self.0[(1, 0)]
    }

    pub fn d(&self) -> f64 {
        self.0[(1, 1)]
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    /// `|AD| + |BC|`, the magnitude the determinant is computed from.
    pub fn determinant_scale(&self) -> f64 {
        (self.a() * self.d()).abs() + (self.b() * self.c()).abs()
    }

    /// Borrow the underlying nalgebra matrix.
    pub fn inner(&self) -> &Matrix2<f64> {
        &self.0
    }
}

impl From<Matrix2<f64>> for AbcdMatrix {
    fn from(matrix: Matrix2<f64>) -> Self {
        Self(matrix)
    }
}

/// `outer * inner` is the system in which a ray meets `inner` first.
impl Mul for AbcdMatrix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl fmt::Display for AbcdMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  A = {:.8}, B = {:.8} mm", self.a(), self.b())?;
        write!(f, "  C = {:.8}, D = {:.8}", self.c(), self.d())
    }
}

/// Thin lens of focal length `f` (mm). Positive `f` converges.
///
/// Returns `[[1, 0], [-1/f, 1]]`.
pub fn lens_matrix(f: f64) -> Result<AbcdMatrix> {
    if f == 0.0 {
        return Err(CloakError::InvalidParameter {
            name: "focal_length",
            value: f,
            reason: "a thin lens cannot have zero focal length",
        });
    }
    if !f.is_finite() {
        return Err(CloakError::InvalidParameter {
            name: "focal_length",
            value: f,
            reason: "focal length must be finite",
        });
    }
    Ok(AbcdMatrix::new(1.0, 0.0, -1.0 / f, 1.0))
}

/// Free-space propagation over `d` (mm).
///
/// Returns `[[1, d], [0, 1]]`.
pub fn translation_matrix(d: f64) -> Result<AbcdMatrix> {
    if !d.is_finite() || d < 0.0 {
        return Err(CloakError::InvalidParameter {
            name: "distance",
            value: d,
            reason: "propagation distance must be finite and non-negative",
        });
    }
    Ok(AbcdMatrix::new(1.0, d, 0.0, 1.0))
}
