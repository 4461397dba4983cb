//! Optical systems and the symmetric four-lens cloak.
//!
//! An [`OpticalSystem`] is an ordered, immutable sequence of thin lenses and
//! free-space gaps, listed in the order a ray meets them. The cloak is the
//! special case built by [`build_system`] from two focal lengths:
//!
//! ```text
//! L(f1) -- t1 -- L(f2) -- t2 -- L(f2) -- t1 -- L(f1)
//! ```
//!
//! with `t1 = f1 + f2` and `t2 = 2 f2 (f1 + f2) / (f1 - f2)`.
//!
//! [`compose_matrix`] folds the element matrices into one system matrix. The
//! first element met by the ray is the rightmost operand of the product.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::{DEFAULT_F1, DEFAULT_F2, DETERMINANT_TOLERANCE},
    error::{CloakError, Result},
    matrix::{lens_matrix, translation_matrix, AbcdMatrix},
};


/// A single optical element on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpticalElement {
    /// Thin lens of the given focal length (mm).
    Lens { focal_length: f64 },
    /// Free-space gap of the given length (mm).
    FreeSpace { distance: f64 },
}

impl OpticalElement {
    /// The ABCD matrix of the element.
    pub fn matrix(&self) -> Result<AbcdMatrix> {
        match self {
            OpticalElement::Lens { focal_length } => lens_matrix(*focal_length),
            OpticalElement::FreeSpace { distance } => translation_matrix(*distance),
        }
    }

    /// Axial distance covered by the element. Thin lenses have none.
    pub fn axial_advance(&self) -> f64 {
        match self {
            OpticalElement::Lens { .. } => 0.0,
            OpticalElement::FreeSpace { distance } => *distance,
        }
    }
}

/// Focal lengths of the symmetric four-lens cloak.
///
/// **Context**: The outer lenses share focal length `f1` and the inner lenses
/// share `f2`. Both separations follow from these two values, so the pair is
/// the whole configuration.
///
/// **How it Works**: Construction checks `f1 > f2 > 0`. With `f1 <= f2` the
/// middle separation `t2` is negative or undefined, so such pairs never make it
/// into a value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloakConfiguration {
    f1: f64,
    f2: f64,
}

impl CloakConfiguration {
    pub fn new(f1: f64, f2: f64) -> Result<Self> {
        let reason = if !f1.is_finite() || !f2.is_finite() {
            Some("focal lengths must be finite")
        } else if f1 <= 0.0 || f2 <= 0.0 {
            Some("focal lengths must be positive")
        } else if f1 == f2 {
            Some("f1 = f2 leaves the inner separation undefined")
        } else if f1 < f2 {
            Some("f1 must exceed f2 for a positive inner separation")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CloakError::InvalidConfiguration { f1, f2, reason }),
            None => Ok(Self { f1, f2 }),
        }
    }

    pub fn f1(&self) -> f64 {
        self.f1
    }

    pub fn f2(&self) -> f64 {
        self.f2
    }

    /// Separation between lenses 1-2 and 3-4.
    pub fn t1(&self) -> f64 {
        self.f1 + self.f2
    }

    /// Separation between lenses 2-3.
    pub fn t2(&self) -> f64 {
        2.0 * self.f2 * (self.f1 + self.f2) / (self.f1 - self.f2)
    }

    /// Distance from the first to the last lens, `2 t1 + t2`.
    pub fn total_length(&self) -> f64 {
        2.0 * self.t1() + self.t2()
    }

    /// Axial positions of the four lenses, first lens at z = 0.
    pub fn lens_positions(&self) -> [f64; 4] {
        let (t1, t2) = (self.t1(), self.t2());
        [0.0, t1, t1 + t2, self.total_length()]
    }

    /// Axial span between the two inner lenses where the cloaked volume lies.
    pub fn cloaked_region(&self) -> (f64, f64) {
        (self.t1(), self.t1() + self.t2())
    }

    /// The seven-element sequence of the cloak.
    pub fn elements(&self) -> Vec<OpticalElement> {
        let (t1, t2) = (self.t1(), self.t2());
        vec![
            OpticalElement::Lens { focal_length: self.f1 },
            OpticalElement::FreeSpace { distance: t1 },
            OpticalElement::Lens { focal_length: self.f2 },
            OpticalElement::FreeSpace { distance: t2 },
            OpticalElement::Lens { focal_length: self.f2 },
            OpticalElement::FreeSpace { distance: t1 },
            OpticalElement::Lens { focal_length: self.f1 },
        ]
    }
}

/// The reference cloak, f1 = 200 mm and f2 = 75 mm.
impl Default for CloakConfiguration {
    fn default() -> Self {
        Self {
            f1: DEFAULT_F1,
            f2: DEFAULT_F2,
        }
    }
}

/// An ordered sequence of validated optical elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpticalSystem {
    elements: Vec<OpticalElement>,
    #[serde(skip)]
    matrices: Vec<AbcdMatrix>,
}

impl OpticalSystem {
    /// Validates every element and caches its matrix.
    pub fn new(elements: Vec<OpticalElement>) -> Result<Self> {
        let matrices = elements
            .iter()
            .map(OpticalElement::matrix)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { elements, matrices })
    }

    pub fn elements(&self) -> &[OpticalElement] {
        &self.elements
    }

    /// Element matrices in traversal order.
    pub fn matrices(&self) -> &[AbcdMatrix] {
        &self.matrices
    }

    /// Elements paired with their matrices, in traversal order.
    pub fn stages(&self) -> impl Iterator<Item = (&OpticalElement, &AbcdMatrix)> {
        self.elements.iter().zip(self.matrices.iter())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Total axial length of the system.
    pub fn length(&self) -> f64 {
        self.elements.iter().map(OpticalElement::axial_advance).sum()
    }
}

/// Builds the four-lens cloak for outer focal length `f1` and inner focal length `f2`.
pub fn build_system(f1: f64, f2: f64) -> Result<OpticalSystem> {
    let config = CloakConfiguration::new(f1, f2)?;
    debug!(
        f1,
        f2,
        t1 = config.t1(),
        t2 = config.t2(),
        "building cloak system"
    );
    OpticalSystem::new(config.elements())
}

/// Multiplies the element matrices of `system` in traversal order.
///
/// Fails with [`CloakError::NumericAnomaly`] when the determinant of the
/// product deviates from 1 by more than [`DETERMINANT_TOLERANCE`] relative to
/// the largest `|AD| + |BC|` met while folding. Long systems near the
/// `f1 = f2` singularity carry entries of order 1e8 and more, and rounding in
/// those products is not a construction error.
pub fn compose_matrix(system: &OpticalSystem) -> Result<AbcdMatrix> {
    // each new element multiplies from the left
    let (total, scale) = system.matrices().iter().fold(
        (AbcdMatrix::identity(), 1.0_f64),
        |(acc, scale), m| {
            let next = *m * acc;
            (next, scale.max(next.determinant_scale()))
        },
    );

    let determinant = total.determinant();
    let deviation = (determinant - 1.0).abs();
    let tolerance = DETERMINANT_TOLERANCE * scale;
    if !(deviation <= tolerance) {
        return Err(CloakError::NumericAnomaly {
            determinant,
            deviation,
            tolerance,
        });
    }

    debug!(
        a = total.a(),
        b = total.b(),
        c = total.c(),
        d = total.d(),
        "composed system matrix"
    );
    Ok(total)
}
