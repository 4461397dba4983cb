use cloak::{
    build_system, compose_matrix, lens_matrix, propagate, propagate_through_system, sample_fan,
    sample_rays, settings, translation_matrix, validate, CloakConfiguration, CloakError, Ray,
};

// Tolerance for comparing heights and lateral shifts in mm
const TOL: f64 = 1e-9;

fn default_config() -> CloakConfiguration {
    CloakConfiguration::new(200.0, 75.0).unwrap()
}

#[test]
fn elementary_matrices_are_unimodular() {
    for f in [0.1, 1.0, 75.0, 200.0, 5e4] {
        assert!((lens_matrix(f).unwrap().determinant() - 1.0).abs() < f64::EPSILON);
    }
    for d in [0.0, 0.1, 275.0, 5e4] {
        assert!((translation_matrix(d).unwrap().determinant() - 1.0).abs() < f64::EPSILON);
    }
}

#[test]
fn composite_determinant_for_valid_configurations() {
    let mut f1 = 60.0;
    while f1 <= 600.0 {
        let mut f2 = 5.0;
        while f2 < 0.9 * f1 {
            let m = compose_matrix(&build_system(f1, f2).unwrap()).unwrap();
            assert!((m.determinant() - 1.0).abs() < 1e-9, "f1 = {}, f2 = {}", f1, f2);
            f2 += 17.0;
        }
        f1 += 45.0;
    }
}

#[test]
fn reference_cloak_is_validated() {
    let config = default_config();
    assert_eq!(config.t1(), 275.0);
    assert!((config.t2() - 330.0).abs() < TOL);

    let m = compose_matrix(&build_system(200.0, 75.0).unwrap()).unwrap();
    let result = validate(&m, config.t1(), config.t2(), 1.0);
    assert!(result.is_afocal);
    assert!(result.is_unity_magnification);
    assert!(result.lateral_shift_ok);
    assert!((m.b() - 880.0).abs() < TOL);
}

#[test]
fn boundary_inputs_raise_errors() {
    assert!(matches!(
        build_system(120.0, 120.0),
        Err(CloakError::InvalidConfiguration { .. })
    ));
    assert!(matches!(
        lens_matrix(0.0),
        Err(CloakError::InvalidParameter { .. })
    ));
    assert!(matches!(
        translation_matrix(-0.5),
        Err(CloakError::InvalidParameter { .. })
    ));
}

#[test]
fn example_ray_is_shifted_not_deflected() {
    let system = build_system(200.0, 75.0).unwrap();
    let m = compose_matrix(&system).unwrap();
    let input = Ray::new(10.0, 0.01);
    let output = propagate(&input, &m);

    assert!((output.theta - input.theta).abs() < 1e-12);
    assert!((output.y - (input.y + m.b() * input.theta)).abs() < TOL);
    assert!((output.y - 18.8).abs() < TOL);

    let trajectory = propagate_through_system(&input, &system);
    assert_eq!(trajectory.len(), 8);
    assert!((trajectory.output().y - output.y).abs() < TOL);
}

#[test]
fn on_axis_rays_shift_linearly_with_angle() {
    let m = compose_matrix(&build_system(200.0, 75.0).unwrap()).unwrap();
    let shifts: Vec<f64> = [0.001, 0.002, 0.004, -0.004]
        .iter()
        .map(|&theta| propagate(&Ray::new(0.0, theta), &m).y)
        .collect();

    assert!(shifts[1].abs() > shifts[0].abs());
    assert!(shifts[2].abs() > shifts[1].abs());
    assert!((shifts[1] - 2.0 * shifts[0]).abs() < TOL);
    assert!((shifts[2] + shifts[3]).abs() < TOL);
}

#[test]
fn sampling_twice_gives_identical_trajectories() {
    let heights = [-20.0, -10.0, 0.0, 10.0, 20.0];
    let first = sample_rays(&default_config(), &heights, 0.005).unwrap();
    let second = sample_rays(&default_config(), &heights, 0.005).unwrap();
    assert_eq!(first, second);

    let fan_a = sample_fan(&default_config(), &heights, &[0.0, 0.005], 50.0).unwrap();
    let fan_b = sample_fan(&default_config(), &heights, &[0.0, 0.005], 50.0).unwrap();
    assert_eq!(fan_a, fan_b);
}

#[test]
fn near_singular_configuration_stays_finite() {
    // f1 just above f2 gives a very long middle gap but a valid system
    let config = CloakConfiguration::new(100.0 + 1e-6, 100.0).unwrap();
    let samples = sample_rays(&config, &[1.0], 0.0).unwrap();
    assert!(samples[0]
        .trajectory
        .points()
        .iter()
        .all(|p| p.ray.is_finite()));

    // rounding in the ~1e8 intermediate entries is not a numeric anomaly
    let m = compose_matrix(&build_system(100.0 + 1e-6, 100.0).unwrap()).unwrap();
    assert!((m.a() - 1.0).abs() < 1e-6);
    assert!((m.b() - config.total_length()).abs() < 1e-6 * config.total_length());
    let result = validate(&m, config.t1(), config.t2(), 1.0);
    assert!(result.is_unity_magnification);
}

#[test]
fn default_settings_load() {
    let settings = settings::load_default_config().unwrap();
    let config = settings.cloak_configuration().unwrap();
    assert_eq!(config, default_config());
}
