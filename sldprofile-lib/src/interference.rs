//! Lateral particle arrangements. A depth profile only needs the number of
//! particles per unit area, which every variant reports through
//! [`InterferenceFunction::particle_density`].

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{Result, SldError, ensure_non_negative, ensure_positive};

/// Two-dimensional Bravais lattice. Lengths in nm, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatticeParams")]
pub struct Lattice2D {
    length_1: f64,
    length_2: f64,
    angle: f64,
    xi: f64,
}

impl Lattice2D {
    /// # Arguments
    /// * `length_1`, `length_2` - Lengths of the basis vectors
    /// * `angle` - Angle between the basis vectors, within `(0, π)`
    /// * `xi` - Rotation of the lattice with respect to the x axis
    pub fn new(length_1: f64, length_2: f64, angle: f64, xi: f64) -> Result<Self> {
        ensure_positive("lattice length", length_1)?;
        ensure_positive("lattice length", length_2)?;
        if !(angle > 0.0 && angle < PI) {
            return Err(SldError::InvalidArgument(format!(
                "lattice angle must lie in (0, pi), got {angle}"
            )));
        }
        if !xi.is_finite() {
            return Err(SldError::InvalidArgument(format!(
                "lattice rotation must be finite, got {xi}"
            )));
        }
        Ok(Lattice2D {
            length_1,
            length_2,
            angle,
            xi,
        })
    }

    /// Square lattice with lattice constant `length`.
    pub fn square(length: f64, xi: f64) -> Result<Self> {
        Self::new(length, length, 0.5 * PI, xi)
    }

    /// Hexagonal lattice, basis vectors 120° apart.
    pub fn hexagonal(length: f64, xi: f64) -> Result<Self> {
        Self::new(length, length, 2.0 * PI / 3.0, xi)
    }

    pub fn length_1(&self) -> f64 {
        self.length_1
    }

    pub fn length_2(&self) -> f64 {
        self.length_2
    }

    /// Angle between the basis vectors in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Lattice rotation; does not affect the density.
    pub fn xi(&self) -> f64 {
        self.xi
    }

    /// Area of the primitive cell in nm².
    pub fn unit_cell_area(&self) -> f64 {
        (self.length_1 * self.length_2 * self.angle.sin()).abs()
    }
}

#[derive(Deserialize)]
struct LatticeParams {
    length_1: f64,
    length_2: f64,
    angle: f64,
    #[serde(default)]
    xi: f64,
}

impl TryFrom<LatticeParams> for Lattice2D {
    type Error = SldError;

    fn try_from(p: LatticeParams) -> Result<Self> {
        Lattice2D::new(p.length_1, p.length_2, p.angle, p.xi)
    }
}

/// Closed set of particle arrangements.
///
/// Deserialized values are checked by [`InterferenceFunction::validate`] once
/// they are set on a [`ParticleLayout`](crate::ParticleLayout).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum InterferenceFunction {
    /// Uncorrelated particles; the density comes from the layout.
    #[default]
    None,
    /// One particle per lattice cell.
    Lattice2D(Lattice2D),
    /// Lattice with cumulative disorder; same mean density as the lattice.
    Paracrystal2D {
        lattice: Lattice2D,
        damping_length: f64,
    },
    /// Short-range order with a characteristic nearest-neighbour distance.
    Radial {
        peak_distance: f64,
        damping_length: f64,
    },
    /// Hard disks of the given radius at an explicit surface density.
    HardDisk { radius: f64, density: f64 },
}

impl InterferenceFunction {
    /// One particle per cell of `lattice`.
    pub fn lattice_2d(lattice: Lattice2D) -> Self {
        InterferenceFunction::Lattice2D(lattice)
    }

    /// Disordered `lattice`; `damping_length` in nm, `>= 0`.
    pub fn paracrystal_2d(lattice: Lattice2D, damping_length: f64) -> Result<Self> {
        let iff = InterferenceFunction::Paracrystal2D {
            lattice,
            damping_length,
        };
        iff.validate()?;
        Ok(iff)
    }

    /// Radial paracrystal; the density is `1 / peak_distance²`.
    pub fn radial(peak_distance: f64, damping_length: f64) -> Result<Self> {
        let iff = InterferenceFunction::Radial {
            peak_distance,
            damping_length,
        };
        iff.validate()?;
        Ok(iff)
    }

    /// Hard disks with `density` particles per nm².
    pub fn hard_disk(radius: f64, density: f64) -> Result<Self> {
        let iff = InterferenceFunction::HardDisk { radius, density };
        iff.validate()?;
        Ok(iff)
    }

    /// Checks the parameters a hand-built or deserialized variant carries.
    pub fn validate(&self) -> Result<()> {
        match *self {
            InterferenceFunction::None | InterferenceFunction::Lattice2D(_) => Ok(()),
            InterferenceFunction::Paracrystal2D { damping_length, .. } => {
                ensure_non_negative("damping length", damping_length)
            }
            InterferenceFunction::Radial {
                peak_distance,
                damping_length,
            } => {
                ensure_positive("peak distance", peak_distance)?;
                ensure_non_negative("damping length", damping_length)
            }
            InterferenceFunction::HardDisk { radius, density } => {
                ensure_positive("hard disk radius", radius)?;
                ensure_positive("hard disk density", density)
            }
        }
    }

    /// Particles per nm², or `None` when the arrangement does not fix it.
    pub fn particle_density(&self) -> Option<f64> {
        match *self {
            InterferenceFunction::None => None,
            InterferenceFunction::Lattice2D(lattice)
            | InterferenceFunction::Paracrystal2D { lattice, .. } => {
                Some(1.0 / lattice.unit_cell_area())
            }
            InterferenceFunction::Radial { peak_distance, .. } => {
                Some(1.0 / (peak_distance * peak_distance))
            }
            InterferenceFunction::HardDisk { density, .. } => Some(density),
        }
    }
}
