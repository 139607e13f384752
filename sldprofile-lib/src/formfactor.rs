//! Particle shapes, described by how much of their volume lies at each height
//! above the particle base.
//!
//! Only the vertical distribution of volume matters for a depth profile, so
//! every shape reduces to its cross-sectional area `A(h)` and the integral
//! `V(h) = ∫₀ʰ A(t) dt`, both evaluated in closed form.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{Result, SldError, ensure_positive};

/// Closed set of particle shapes. Lengths in nm, angles in radians.
///
/// Use the validating constructors; a variant built by hand or deserialized
/// is checked by [`FormFactor::validate`] when it is wrapped into a particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FormFactor {
    Box {
        length: f64,
        width: f64,
        height: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
    },
    /// Truncated cone with base radius `radius` and base angle `alpha`.
    Cone {
        radius: f64,
        height: f64,
        alpha: f64,
    },
    /// Truncated pyramid with a square base of edge `base_edge`.
    Pyramid {
        base_edge: f64,
        height: f64,
        alpha: f64,
    },
    Sphere {
        radius: f64,
    },
    /// Spheroid with equatorial radius `radius` and polar extent `height`.
    Spheroid {
        radius: f64,
        height: f64,
    },
}

impl FormFactor {
    /// Rectangular box; all lengths in nm.
    pub fn cuboid(length: f64, width: f64, height: f64) -> Result<Self> {
        Self::checked(FormFactor::Box {
            length,
            width,
            height,
        })
    }

    /// Upright cylinder; lengths in nm.
    pub fn cylinder(radius: f64, height: f64) -> Result<Self> {
        Self::checked(FormFactor::Cylinder { radius, height })
    }

    /// # Arguments
    /// * `radius` - Base radius in nm
    /// * `height` - Height in nm, at most `radius * tan(alpha)`
    /// * `alpha` - Angle between base and side in radians, within `(0, π/2]`
    pub fn cone(radius: f64, height: f64, alpha: f64) -> Result<Self> {
        Self::checked(FormFactor::Cone {
            radius,
            height,
            alpha,
        })
    }

    /// # Arguments
    /// * `base_edge` - Edge of the square base in nm
    /// * `height` - Height in nm, at most `base_edge / 2 * tan(alpha)`
    /// * `alpha` - Angle between base and faces in radians, within `(0, π/2]`
    pub fn pyramid(base_edge: f64, height: f64, alpha: f64) -> Result<Self> {
        Self::checked(FormFactor::Pyramid {
            base_edge,
            height,
            alpha,
        })
    }

    /// Full sphere, `2 * radius` tall.
    pub fn sphere(radius: f64) -> Result<Self> {
        Self::checked(FormFactor::Sphere { radius })
    }

    pub fn spheroid(radius: f64, height: f64) -> Result<Self> {
        Self::checked(FormFactor::Spheroid { radius, height })
    }

    fn checked(ff: FormFactor) -> Result<Self> {
        ff.validate()?;
        Ok(ff)
    }

    /// Checks that all dimensions are positive and the shape is closed.
    pub fn validate(&self) -> Result<()> {
        match *self {
            FormFactor::Box {
                length,
                width,
                height,
            } => {
                ensure_positive("box length", length)?;
                ensure_positive("box width", width)?;
                ensure_positive("box height", height)
            }
            FormFactor::Cylinder { radius, height } => {
                ensure_positive("cylinder radius", radius)?;
                ensure_positive("cylinder height", height)
            }
            FormFactor::Cone {
                radius,
                height,
                alpha,
            } => {
                ensure_positive("cone radius", radius)?;
                ensure_positive("cone height", height)?;
                check_side_angle("cone", alpha)?;
                check_truncation("cone", height, radius * alpha.tan())
            }
            FormFactor::Pyramid {
                base_edge,
                height,
                alpha,
            } => {
                ensure_positive("pyramid base edge", base_edge)?;
                ensure_positive("pyramid height", height)?;
                check_side_angle("pyramid", alpha)?;
                check_truncation("pyramid", height, 0.5 * base_edge * alpha.tan())
            }
            FormFactor::Sphere { radius } => ensure_positive("sphere radius", radius),
            FormFactor::Spheroid { radius, height } => {
                ensure_positive("spheroid radius", radius)?;
                ensure_positive("spheroid height", height)
            }
        }
    }

    /// Vertical extent of the particle in nm.
    pub fn height(&self) -> f64 {
        match *self {
            FormFactor::Box { height, .. }
            | FormFactor::Cylinder { height, .. }
            | FormFactor::Cone { height, .. }
            | FormFactor::Pyramid { height, .. }
            | FormFactor::Spheroid { height, .. } => height,
            FormFactor::Sphere { radius } => 2.0 * radius,
        }
    }

    /// Cross-sectional area at height `h` above the base, zero outside the
    /// particle.
    pub fn area_at(&self, h: f64) -> f64 {
        if h < 0.0 || h > self.height() {
            return 0.0;
        }
        match *self {
            FormFactor::Box { length, width, .. } => length * width,
            FormFactor::Cylinder { radius, .. } => PI * radius * radius,
            FormFactor::Cone { radius, alpha, .. } => {
                let r = radius - h / alpha.tan();
                PI * r * r
            }
            FormFactor::Pyramid {
                base_edge, alpha, ..
            } => {
                let a = base_edge - 2.0 * h / alpha.tan();
                a * a
            }
            FormFactor::Sphere { radius } => spheroid_area(radius, radius, h),
            FormFactor::Spheroid { radius, height } => spheroid_area(radius, 0.5 * height, h),
        }
    }

    /// Largest cross-section between heights `h0` and `h1` (in either
    /// order), zero when the range misses the particle.
    pub fn max_area_between(&self, h0: f64, h1: f64) -> f64 {
        let lo = h0.min(h1).max(0.0);
        let hi = h0.max(h1).min(self.height());
        if lo >= hi {
            return 0.0;
        }
        // tapered shapes are widest at the base, ellipsoids at mid-height
        let widest = match *self {
            FormFactor::Sphere { .. } | FormFactor::Spheroid { .. } => 0.5 * self.height(),
            _ => 0.0,
        };
        self.area_at(widest.clamp(lo, hi))
    }

    /// Volume between the base and height `h`, with `h` clamped to the
    /// particle.
    pub fn volume_below(&self, h: f64) -> f64 {
        let h = h.clamp(0.0, self.height());
        match *self {
            FormFactor::Box { length, width, .. } => length * width * h,
            FormFactor::Cylinder { radius, .. } => PI * radius * radius * h,
            FormFactor::Cone { radius, alpha, .. } => {
                let c = 1.0 / alpha.tan();
                PI * h * (radius * radius - radius * c * h + c * c * h * h / 3.0)
            }
            FormFactor::Pyramid {
                base_edge, alpha, ..
            } => {
                let c = 1.0 / alpha.tan();
                h * (base_edge * base_edge - 2.0 * base_edge * c * h + 4.0 * c * c * h * h / 3.0)
            }
            FormFactor::Sphere { radius } => spheroid_volume_below(radius, radius, h),
            FormFactor::Spheroid { radius, height } => {
                spheroid_volume_below(radius, 0.5 * height, h)
            }
        }
    }

    /// Volume between heights `h0` and `h1` (in either order).
    pub fn volume_between(&self, h0: f64, h1: f64) -> f64 {
        let (lo, hi) = if h0 <= h1 { (h0, h1) } else { (h1, h0) };
        (self.volume_below(hi) - self.volume_below(lo)).max(0.0)
    }

    /// Total particle volume in nm³.
    pub fn volume(&self) -> f64 {
        self.volume_below(self.height())
    }
}

fn check_side_angle(shape: &str, alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha <= 0.5 * PI) {
        return Err(SldError::InvalidArgument(format!(
            "{shape} angle alpha must lie in (0, pi/2], got {alpha}"
        )));
    }
    Ok(())
}

fn check_truncation(shape: &str, height: f64, apex_height: f64) -> Result<()> {
    if height > apex_height * (1.0 + 1e-12) {
        return Err(SldError::InvalidArgument(format!(
            "{shape} height {height} exceeds apex height {apex_height}"
        )));
    }
    Ok(())
}

/// `semi` is the polar semi-axis.
fn spheroid_area(radius: f64, semi: f64, h: f64) -> f64 {
    let t = (h - semi) / semi;
    (PI * radius * radius * (1.0 - t * t)).max(0.0)
}

fn spheroid_volume_below(radius: f64, semi: f64, h: f64) -> f64 {
    let d = h - semi;
    PI * radius * radius * (h - (d * d * d + semi * semi * semi) / (3.0 * semi * semi))
}
