/// Default outer lens focal length (mm).
pub const DEFAULT_F1: f64 = 200.0;
/// Default inner lens focal length (mm).
pub const DEFAULT_F2: f64 = 75.0;
pub const DEFAULT_REFR_INDEX: f64 = 1.0; // surrounding medium
/// Tolerance on the dimensionless A and C entries during cloak validation.
pub const VALIDATION_TOLERANCE: f64 = 1e-6;
/// Largest allowed |det - 1| of a composed system matrix, relative to the
/// magnitude of its entries.
pub const DETERMINANT_TOLERANCE: f64 = 1e-9;
/// Free-space distance traced past the last lens to show the exit direction (mm).
pub const EXIT_EXTENSION: f64 = 50.0;
