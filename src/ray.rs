//! Paraxial rays and their propagation through optical systems.
//!
//! A [`Ray`] is the pair `(y, theta)` in the meridional plane. Propagation
//! never mutates a ray: each step yields a new value. Walking a system
//! element by element gives a [`Trajectory`], the ray state at every optical
//! plane together with its axial position, which is what plotting needs.
//!
//! Non-finite ray components are carried through unchanged so callers can
//! spot numerical blow-up themselves.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    matrix::{translation_matrix, AbcdMatrix},
    system::OpticalSystem,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::lens_matrix;
    use crate::system::{build_system, compose_matrix, OpticalElement};

    #[test]
    fn propagate_applies_matrix() {
        let m = AbcdMatrix::new(1.0, 2.0, 3.0, 4.0);
        let out = propagate(&Ray::new(5.0, 6.0), &m);
        assert_eq!(out, Ray::new(17.0, 39.0));
    }

    #[test]
    fn lens_bends_but_keeps_height() {
        let out = propagate(&Ray::new(10.0, 0.0), &lens_matrix(200.0).unwrap());
        assert_eq!(out.y, 10.0);
        assert!((out.theta + 0.05).abs() < 1e-15);
    }

    #[test]
    fn non_finite_passes_through() {
        let m = translation_matrix(10.0).unwrap();
        let out = propagate(&Ray::new(f64::NAN, 0.0), &m);
        assert!(out.y.is_nan());
        let out = propagate(&Ray::new(0.0, f64::INFINITY), &m);
        assert!(out.y.is_infinite());
        assert!(!out.is_finite());
    }

    #[test]
    fn trajectory_length_and_positions() {
        let system = build_system(200.0, 75.0).unwrap();
        let trajectory = propagate_through_system(&Ray::new(5.0, 0.0), &system);
        assert_eq!(trajectory.len(), system.len() + 1);

        let z: Vec<f64> = trajectory.z().collect();
        assert_eq!(z[0], 0.0);
        assert_eq!(z[1], 0.0);
        assert_eq!(z[2], 275.0);
        assert_eq!(z[3], 275.0);
        assert!((z[4] - 605.0).abs() < 1e-9);
        assert!((z[7] - 880.0).abs() < 1e-9);
        assert!((trajectory.final_z() - 880.0).abs() < 1e-9);
    }

    #[test]
    fn stepwise_agrees_with_composite() {
        let system = build_system(200.0, 75.0).unwrap();
        let m = compose_matrix(&system).unwrap();
        let input = Ray::new(10.0, 0.01);

        let direct = propagate(&input, &m);
        let stepped = propagate_through_system(&input, &system);
        let last = stepped.output();
        assert!((direct.y - last.y).abs() < 1e-9);
        assert!((direct.theta - last.theta).abs() < 1e-12);
        assert_eq!(stepped.input(), input);
    }

    #[test]
    fn collimated_ray_crosses_axis_at_focus() {
        let system = OpticalSystem::new(vec![
            OpticalElement::Lens { focal_length: 50.0 },
            OpticalElement::FreeSpace { distance: 50.0 },
        ])
        .unwrap();
        let trajectory = propagate_through_system(&Ray::new(3.0, 0.0), &system);
        assert!(trajectory.output().y.abs() < 1e-12);
    }

    #[test]
    fn extension_appends_free_space() {
        let system = build_system(200.0, 75.0).unwrap();
        let trajectory = propagate_through_system(&Ray::new(0.0, 0.01), &system);
        let exit = trajectory.output();
        let extended = trajectory.clone().extended(50.0).unwrap();
        assert_eq!(extended.len(), trajectory.len() + 1);
        let last = extended.points().last().unwrap();
        assert!((last.z - (trajectory.final_z() + 50.0)).abs() < 1e-9);
        assert!((last.ray.y - (exit.y + 50.0 * exit.theta)).abs() < 1e-12);
        assert!(trajectory.extended(-1.0).is_err());
    }
}

/// A paraxial ray: height `y` (mm) and angle `theta` (rad) to the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub y: f64,
    pub theta: f64,
}

impl Ray {
    pub fn new(y: f64, theta: f64) -> Self {
        Self { y, theta }
    }

    pub fn as_vector(&self) -> Vector2<f64> {
        Vector2::new(self.y, self.theta)
    }

    pub fn is_finite(&self) -> bool {
        self.y.is_finite() && self.theta.is_finite()
    }
}

impl From<Vector2<f64>> for Ray {
    fn from(v: Vector2<f64>) -> Self {
        Self::new(v[0], v[1])
    }
}

/// One sample of a trajectory: the ray state at axial position `z` (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub z: f64,
    pub ray: Ray,
}

/// Ray states at successive optical planes, starting at z = 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The ray before the first element.
    pub fn input(&self) -> Ray {
        self.points[0].ray
    }

    /// The ray after the last recorded plane.
    pub fn output(&self) -> Ray {
        self.points[self.points.len() - 1].ray
    }

    pub fn final_z(&self) -> f64 {
        self.points[self.points.len() - 1].z
    }

    /// Axial positions, for plotting.
    pub fn z(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.z)
    }

    /// Ray heights, for plotting.
    pub fn y(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.ray.y)
    }

    /// Continues the trajectory through `distance` mm of free space past its
    /// last plane.
    pub fn extended(mut self, distance: f64) -> Result<Self> {
        let m = translation_matrix(distance)?;
        let last = self.points[self.points.len() - 1];
        self.points.push(TrajectoryPoint {
            z: last.z + distance,
            ray: propagate(&last.ray, &m),
        });
        Ok(self)
    }
}

/// Applies `matrix` to `ray`: `[y', θ'] = [[A, B], [C, D]] [y, θ]`.
pub fn propagate(ray: &Ray, matrix: &AbcdMatrix) -> Ray {
    Ray::from(matrix.inner() * ray.as_vector())
}

/// Walks `ray` through `system` one element at a time.
///
/// The result holds `system.len() + 1` points: the input at z = 0, then the
/// state after each element. Lenses do not advance z; free space advances it
/// by its distance.
pub fn propagate_through_system(ray: &Ray, system: &OpticalSystem) -> Trajectory {
    let mut points = Vec::with_capacity(system.len() + 1);
    let mut z = 0.0;
    let mut current = *ray;
    points.push(TrajectoryPoint { z, ray: current });

    for (element, matrix) in system.stages() {
        current = propagate(&current, matrix);
        z += element.axial_advance();
        points.push(TrajectoryPoint { z, ray: current });
    }

    Trajectory { points }
}
