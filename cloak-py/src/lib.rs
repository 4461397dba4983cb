use cloak::{CloakConfiguration, CloakError, OpticalElement, Validator};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(err: CloakError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// The elements of the cloak as `(kind, value)` pairs, in traversal order.
#[pyfunction]
fn build_system(f1: f64, f2: f64) -> PyResult<Vec<(String, f64)>> {
    let system = cloak::build_system(f1, f2).map_err(to_py_err)?;
    Ok(system
        .elements()
        .iter()
        .map(|element| match element {
            OpticalElement::Lens { focal_length } => ("lens".to_string(), *focal_length),
            OpticalElement::FreeSpace { distance } => ("free_space".to_string(), *distance),
        })
        .collect())
}

/// The composite matrix entries `(A, B, C, D)`.
#[pyfunction]
fn compose_matrix(f1: f64, f2: f64) -> PyResult<(f64, f64, f64, f64)> {
    let system = cloak::build_system(f1, f2).map_err(to_py_err)?;
    let m = cloak::compose_matrix(&system).map_err(to_py_err)?;
    Ok((m.a(), m.b(), m.c(), m.d()))
}

/// Cloak condition flags `(afocal, unity_magnification, lateral_shift_ok)`.
#[pyfunction]
#[pyo3(signature = (f1, f2, refractive_index=1.0, tolerance=1e-6))]
fn validate(f1: f64, f2: f64, refractive_index: f64, tolerance: f64) -> PyResult<(bool, bool, bool)> {
    let config = CloakConfiguration::new(f1, f2).map_err(to_py_err)?;
    let system = cloak::build_system(f1, f2).map_err(to_py_err)?;
    let m = cloak::compose_matrix(&system).map_err(to_py_err)?;
    let result = Validator::new(tolerance).validate(&m, config.t1(), config.t2(), refractive_index);
    Ok((
        result.is_afocal,
        result.is_unity_magnification,
        result.lateral_shift_ok,
    ))
}

/// Trajectories as `(height, z_values, y_values)` per entrance height.
#[pyfunction]
#[pyo3(signature = (f1, f2, heights, angle=0.0))]
fn sample_rays(
    f1: f64,
    f2: f64,
    heights: Vec<f64>,
    angle: f64,
) -> PyResult<Vec<(f64, Vec<f64>, Vec<f64>)>> {
    let config = CloakConfiguration::new(f1, f2).map_err(to_py_err)?;
    let samples = cloak::sample_rays(&config, &heights, angle).map_err(to_py_err)?;
    Ok(samples
        .iter()
        .map(|s| (s.height, s.trajectory.z().collect(), s.trajectory.y().collect()))
        .collect())
}

/// Paraxial Rochester Cloak ray tracing implemented in Rust.
#[pymodule]
fn _cloak_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_system, m)?)?;
    m.add_function(wrap_pyfunction!(compose_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(validate, m)?)?;
    m.add_function(wrap_pyfunction!(sample_rays, m)?)?;
    Ok(())
}
