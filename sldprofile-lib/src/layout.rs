use serde::{Deserialize, Serialize};

use crate::error::{Result, SldError, ensure_positive};
use crate::formfactor::FormFactor;
use crate::interference::InterferenceFunction;
use crate::material::Material;
use crate::units::DEFAULT_SURFACE_DENSITY;

/// A particle of one material and shape.
///
/// Placement inside the host layer: centered in a finite layer, resting on
/// the bottom interface of the ambient layer, hanging from the top interface
/// of the substrate. `vertical_offset` shifts the particle upward (towards the
/// ambient) from that default, in nm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ParticleParams")]
pub struct Particle {
    material: Material,
    form_factor: FormFactor,
    vertical_offset: f64,
}

impl Particle {
    /// Fails with `InvalidArgument` when `form_factor` does not validate.
    pub fn new(material: Material, form_factor: FormFactor) -> Result<Self> {
        form_factor.validate()?;
        Ok(Particle {
            material,
            form_factor,
            vertical_offset: 0.0,
        })
    }

    /// Shifts the particle upward by `offset` nm; negative values sink it.
    pub fn with_vertical_offset(mut self, offset: f64) -> Result<Self> {
        if !offset.is_finite() {
            return Err(SldError::InvalidArgument(format!(
                "vertical offset must be finite, got {offset}"
            )));
        }
        self.vertical_offset = offset;
        Ok(self)
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn form_factor(&self) -> &FormFactor {
        &self.form_factor
    }

    /// Upward shift from the default placement, in nm.
    pub fn vertical_offset(&self) -> f64 {
        self.vertical_offset
    }
}

#[derive(Deserialize)]
struct ParticleParams {
    material: Material,
    form_factor: FormFactor,
    #[serde(default)]
    vertical_offset: f64,
}

impl TryFrom<ParticleParams> for Particle {
    type Error = SldError;

    fn try_from(p: ParticleParams) -> Result<Self> {
        Particle::new(p.material, p.form_factor)?.with_vertical_offset(p.vertical_offset)
    }
}

/// A particle together with its relative abundance in a layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedParticle {
    pub particle: Particle,
    #[serde(default = "unit_abundance")]
    pub abundance: f64,
}

fn unit_abundance() -> f64 {
    1.0
}

/// Particles sharing one lateral arrangement.
///
/// Deserialization replays the setters below, so abundances, interference
/// and density are validated as if set by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "LayoutParams")]
pub struct ParticleLayout {
    particles: Vec<WeightedParticle>,
    interference: InterferenceFunction,
    surface_density: Option<f64>,
}

impl ParticleLayout {
    /// Empty layout without interference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a particle with abundance 1.
    pub fn add_particle(&mut self, particle: Particle) {
        self.particles.push(WeightedParticle {
            particle,
            abundance: 1.0,
        });
    }

    /// Adds a particle with a relative weight `abundance > 0`. Weights are
    /// normalized by their sum when the layout is sliced.
    pub fn add_particle_with_abundance(&mut self, particle: Particle, abundance: f64) -> Result<()> {
        ensure_positive("particle abundance", abundance)?;
        self.particles.push(WeightedParticle {
            particle,
            abundance,
        });
        Ok(())
    }

    /// Replaces the lateral arrangement after validating it.
    pub fn set_interference(&mut self, interference: InterferenceFunction) -> Result<()> {
        interference.validate()?;
        self.interference = interference;
        Ok(())
    }

    /// Sets the particle density (nm^-2) used when the interference function
    /// does not define one.
    pub fn set_total_particle_surface_density(&mut self, density: f64) -> Result<()> {
        ensure_positive("particle surface density", density)?;
        self.surface_density = Some(density);
        Ok(())
    }

    /// Particles per nm². A density implied by the interference function
    /// takes precedence over an explicitly set one.
    pub fn total_particle_surface_density(&self) -> f64 {
        self.interference
            .particle_density()
            .or(self.surface_density)
            .unwrap_or(DEFAULT_SURFACE_DENSITY)
    }

    /// Sum of all abundances.
    pub fn total_abundance(&self) -> f64 {
        self.particles.iter().map(|p| p.abundance).sum()
    }

    /// Particles in insertion order.
    pub fn particles(&self) -> &[WeightedParticle] {
        &self.particles
    }

    pub fn interference(&self) -> &InterferenceFunction {
        &self.interference
    }

    /// True when no particle was added; such a layout leaves its layer pure.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct LayoutParams {
    particles: Vec<WeightedParticle>,
    interference: InterferenceFunction,
    surface_density: Option<f64>,
}

impl TryFrom<LayoutParams> for ParticleLayout {
    type Error = SldError;

    fn try_from(p: LayoutParams) -> Result<Self> {
        let mut layout = ParticleLayout::new();
        for weighted in p.particles {
            layout.add_particle_with_abundance(weighted.particle, weighted.abundance)?;
        }
        layout.set_interference(p.interference)?;
        if let Some(density) = p.surface_density {
            layout.set_total_particle_surface_density(density)?;
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interference::Lattice2D;
    use approx::assert_relative_eq;

    fn sphere_particle() -> Particle {
        let material = Material::by_sld("Particle", 5e-6, 0.0);
        Particle::new(material, FormFactor::sphere(2.0).unwrap()).unwrap()
    }

    #[test]
    fn test_density_precedence() {
        let mut layout = ParticleLayout::new();
        layout.add_particle(sphere_particle());
        assert_eq!(layout.total_particle_surface_density(), DEFAULT_SURFACE_DENSITY);

        layout.set_total_particle_surface_density(0.05).unwrap();
        assert_eq!(layout.total_particle_surface_density(), 0.05);

        let lattice = Lattice2D::square(20.0, 0.0).unwrap();
        layout
            .set_interference(InterferenceFunction::lattice_2d(lattice))
            .unwrap();
        assert_relative_eq!(layout.total_particle_surface_density(), 1.0 / 400.0);
    }

    #[test]
    fn test_abundances() {
        let mut layout = ParticleLayout::new();
        layout.add_particle(sphere_particle());
        layout
            .add_particle_with_abundance(sphere_particle(), 3.0)
            .unwrap();
        assert_eq!(layout.total_abundance(), 4.0);
        assert_eq!(layout.particles().len(), 2);
        assert!(
            layout
                .add_particle_with_abundance(sphere_particle(), 0.0)
                .is_err()
        );
    }

    #[test]
    fn test_invalid_inputs() {
        let mut layout = ParticleLayout::new();
        assert!(layout.set_total_particle_surface_density(-1.0).is_err());
        let bad = InterferenceFunction::HardDisk {
            radius: 1.0,
            density: -2.0,
        };
        assert!(layout.set_interference(bad).is_err());
        assert_eq!(layout.interference(), &InterferenceFunction::None);
        assert!(sphere_particle().with_vertical_offset(f64::NAN).is_err());
    }
}
