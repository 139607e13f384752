//! Unit constants. Lengths are in nanometers and angles in radians, so a
//! value written as `30.0 * ANGSTROM` or `75.0 * DEG` lands in the internal
//! convention.

/// Nanometer (base length unit)
pub const NM: f64 = 1.0;

/// Angstrom (nm)
pub const ANGSTROM: f64 = 0.1;

/// Radian (base angle unit)
pub const RAD: f64 = 1.0;

/// Degree (rad)
pub const DEG: f64 = std::f64::consts::PI / 180.0;

/// Particle surface density used when a layout has no interference function
/// and no explicit density (nm^-2).
pub const DEFAULT_SURFACE_DENSITY: f64 = 0.01;
