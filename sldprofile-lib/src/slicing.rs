//! Cuts a multilayer into homogeneous slabs along the depth axis.
//!
//! Depth grows downward and is zero at the bottom of the ambient layer. Each
//! slab carries the SLD of its host material blended with the particle
//! material by the slab-averaged particle volume fraction. Slab boundaries
//! that coincide with a layer interface inherit its roughness; boundaries
//! between slices of one layer are sharp.

use log::{debug, warn};
use num_complex::Complex64;
use serde::Serialize;

use crate::error::{Result, SldError};
use crate::formfactor::FormFactor;
use crate::layer::Layer;
use crate::multilayer::Multilayer;
use crate::roughness::{Kernel, Roughness};

/// Margin (nm) around the outermost boundaries when all interfaces coincide.
const DEFAULT_MARGIN: f64 = 10.0;

/// Margin around a rough outer interface, in units of its sigma.
const SIGMA_MARGIN: f64 = 5.0;

/// A slab whose particles would fill more than its volume, or a layer whose
/// particles cover more than the lateral area at some depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FractionOverflow {
    pub layer: usize,
    pub slab: usize,
    /// Summed volume fraction before clamping, or the summed lateral
    /// coverage when that is what overflows.
    pub fraction: f64,
}

impl From<FractionOverflow> for SldError {
    fn from(o: FractionOverflow) -> Self {
        SldError::OverflowCondition {
            layer: o.layer,
            slab: o.slab,
            fraction: o.fraction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slab {
    /// Index of the host layer in the multilayer.
    pub layer: usize,
    pub top: f64,
    pub bottom: f64,
    pub sld: Complex64,
    /// Particle volume fraction in `[0, 1]`.
    pub particle_fraction: f64,
}

impl Slab {
    pub fn thickness(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Boundary between two consecutive slabs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub depth: f64,
    pub roughness: Roughness,
}

/// Where a layer sits in the stack, which fixes how its particles are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Ambient,
    Inner,
    Substrate,
}

/// A particle species placed at a definite depth inside its host layer.
struct PlacedParticle<'a> {
    form_factor: &'a FormFactor,
    sld: Complex64,
    /// Particles of this species per nm².
    density: f64,
    /// Depth of the particle base (its deepest point).
    base: f64,
}

impl PlacedParticle<'_> {
    fn top(&self) -> f64 {
        self.base - self.form_factor.height()
    }

    /// Volume fraction averaged over `[top, bottom]`.
    fn fraction_in(&self, top: f64, bottom: f64) -> f64 {
        let volume = self
            .form_factor
            .volume_between(self.base - bottom, self.base - top);
        self.density * volume / (bottom - top)
    }

    /// Share of the lateral area covered at the widest cross-section that
    /// lies within `[top, bottom]`.
    fn coverage_in(&self, top: f64, bottom: f64) -> f64 {
        self.density
            * self
                .form_factor
                .max_area_between(self.base - bottom, self.base - top)
    }
}

/// A frozen multilayer resolved into slabs.
#[derive(Debug, Clone)]
pub struct SlicedSample {
    slabs: Vec<Slab>,
    boundaries: Vec<Boundary>,
    overflows: Vec<FractionOverflow>,
}

impl SlicedSample {
    /// Fails with `InvalidArgument` if the multilayer has fewer than two
    /// layers.
    pub fn new(multilayer: &Multilayer) -> Result<Self> {
        let n = multilayer.number_of_layers();
        if n < 2 {
            return Err(SldError::InvalidArgument(format!(
                "a multilayer needs at least 2 layers, got {n}"
            )));
        }

        let mut sample = SlicedSample {
            slabs: Vec::new(),
            boundaries: Vec::new(),
            overflows: Vec::new(),
        };

        let mut depth = 0.0;
        for (index, layer) in multilayer.layers().iter().enumerate() {
            let (position, top, bottom) = if index == 0 {
                (Position::Ambient, f64::NEG_INFINITY, 0.0)
            } else if index == n - 1 {
                (Position::Substrate, depth, f64::INFINITY)
            } else {
                let top = depth;
                depth += layer.finite_thickness();
                (Position::Inner, top, depth)
            };
            let top_roughness = match index {
                0 => Roughness::sharp(),
                i => multilayer.roughness_at(i - 1).unwrap_or_default(),
            };
            sample.push_layer(index, layer, position, top, bottom, top_roughness);
        }

        debug!(
            "sliced {} layers into {} slabs ({} rough boundaries)",
            n,
            sample.slabs.len(),
            sample
                .boundaries
                .iter()
                .filter(|b| !b.roughness.is_sharp())
                .count()
        );
        Ok(sample)
    }

    fn push_layer(
        &mut self,
        index: usize,
        layer: &Layer,
        position: Position,
        top: f64,
        bottom: f64,
        top_roughness: Roughness,
    ) {
        if top >= bottom {
            return;
        }
        let particles = place_particles(layer, position, top, bottom);
        let base_sld = layer.material().sld();
        let slices = layer.slice_count();

        let mut intervals = Vec::with_capacity(slices + 1);
        match position {
            Position::Inner => intervals.extend(split(top, bottom, slices)),
            Position::Ambient => {
                let region_top = particles
                    .iter()
                    .map(|p| p.top())
                    .fold(bottom, f64::min);
                if region_top < bottom {
                    intervals.push((top, region_top));
                    intervals.extend(split(region_top, bottom, slices));
                } else {
                    intervals.push((top, bottom));
                }
            }
            Position::Substrate => {
                let region_bottom = particles.iter().map(|p| p.base).fold(top, f64::max);
                if region_bottom > top {
                    intervals.extend(split(top, region_bottom, slices));
                    intervals.push((region_bottom, bottom));
                } else {
                    intervals.push((top, bottom));
                }
            }
        }

        let first_slab = self.slabs.len();
        let recorded = self.overflows.len();
        for (slab_top, slab_bottom) in intervals {
            // below float resolution deep in the stack
            if slab_bottom <= slab_top {
                continue;
            }
            let pure = particles.is_empty() || slab_top.is_infinite() || slab_bottom.is_infinite();
            let (sld, particle_fraction) = if pure {
                (base_sld, 0.0)
            } else {
                self.blend(index, base_sld, &particles, slab_top, slab_bottom)
            };
            if !self.slabs.is_empty() {
                let roughness = if self.slabs.len() == first_slab {
                    top_roughness
                } else {
                    Roughness::sharp()
                };
                self.boundaries.push(Boundary {
                    depth: slab_top,
                    roughness,
                });
            }
            self.slabs.push(Slab {
                layer: index,
                top: slab_top,
                bottom: slab_bottom,
                sld,
                particle_fraction,
            });
        }

        // Particles wider than their lattice cell may still average below 1
        // over a slab; flag them once per layer.
        let coverage: f64 = particles.iter().map(|p| p.coverage_in(top, bottom)).sum();
        if coverage > 1.0 && self.overflows.len() == recorded {
            let slab = (first_slab..self.slabs.len())
                .max_by(|&a, &b| {
                    self.slabs[a]
                        .particle_fraction
                        .total_cmp(&self.slabs[b].particle_fraction)
                })
                .unwrap_or(first_slab);
            warn!(
                "particles cover {coverage:.4} of the lateral area in layer {index}; \
                 the slab SLDs describe an impossible packing"
            );
            self.overflows.push(FractionOverflow {
                layer: index,
                slab,
                fraction: coverage,
            });
        }
    }

    /// SLD of the finite slab `[top, bottom]` of layer `layer`, with the
    /// summed particle fraction clamped to 1.
    fn blend(
        &mut self,
        layer: usize,
        base_sld: Complex64,
        particles: &[PlacedParticle<'_>],
        top: f64,
        bottom: f64,
    ) -> (Complex64, f64) {
        let fractions: Vec<f64> = particles
            .iter()
            .map(|p| p.fraction_in(top, bottom))
            .collect();
        let total: f64 = fractions.iter().sum();
        if total <= 0.0 {
            return (base_sld, 0.0);
        }

        let overflow = total > 1.0;
        if overflow {
            let slab = self.slabs.len();
            warn!(
                "particle volume fraction {total:.4} exceeds 1 in slab {slab} \
                 (depth {top:.3}..{bottom:.3} nm) of layer {layer}; clamping to 1"
            );
            self.overflows.push(FractionOverflow {
                layer,
                slab,
                fraction: total,
            });
        }

        let fraction = total.min(1.0);
        let mut sld = base_sld * (1.0 - fraction);
        for (p, &f) in particles.iter().zip(&fractions) {
            let share = if overflow { f / total } else { f };
            sld += p.sld * share;
        }
        (sld, fraction)
    }

    pub fn slabs(&self) -> &[Slab] {
        &self.slabs
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn overflows(&self) -> &[FractionOverflow] {
        &self.overflows
    }

    /// Index of the slab holding depth `z`. A depth exactly on a boundary
    /// belongs to the upper slab.
    pub fn slab_index_at(&self, z: f64) -> usize {
        self.boundaries.partition_point(|b| b.depth < z)
    }

    /// SLD at depth `z` with every rough boundary smoothed by `kernel`.
    ///
    /// Written as the sharp step value plus a correction per rough boundary,
    /// so a stack without roughness reproduces the slab SLDs exactly.
    pub fn sld_at(&self, z: f64, kernel: Kernel) -> Complex64 {
        let mut sld = self.slabs[self.slab_index_at(z)].sld;
        for (i, boundary) in self.boundaries.iter().enumerate() {
            let sigma = boundary.roughness.sigma();
            if sigma <= 0.0 {
                continue;
            }
            let x = z - boundary.depth;
            let step = if x > 0.0 { 1.0 } else { 0.0 };
            let jump = self.slabs[i + 1].sld - self.slabs[i].sld;
            sld += jump * (kernel.transition(x / sigma) - step);
        }
        sld
    }

    /// Depth range covering every boundary plus a margin: five sigma beyond
    /// a rough outer interface, otherwise a twentieth of the boundary span
    /// (10 nm when the span is zero).
    pub fn default_limits(&self) -> (f64, f64) {
        let (Some(first), Some(last)) = (self.boundaries.first(), self.boundaries.last()) else {
            return (-DEFAULT_MARGIN, DEFAULT_MARGIN);
        };
        let span = last.depth - first.depth;
        let margin = if span > 0.0 {
            span / 20.0
        } else {
            DEFAULT_MARGIN
        };
        let margin_for = |roughness: Roughness| {
            if roughness.is_sharp() {
                margin
            } else {
                SIGMA_MARGIN * roughness.sigma()
            }
        };
        (
            first.depth - margin_for(first.roughness),
            last.depth + margin_for(last.roughness),
        )
    }
}

/// Places the particles of `layer`'s layout at their default depths.
fn place_particles<'a>(
    layer: &'a Layer,
    position: Position,
    top: f64,
    bottom: f64,
) -> Vec<PlacedParticle<'a>> {
    let Some(layout) = layer.layout() else {
        return Vec::new();
    };
    let total_abundance = layout.total_abundance();
    if layout.is_empty() || total_abundance <= 0.0 {
        return Vec::new();
    }
    let density = layout.total_particle_surface_density();

    layout
        .particles()
        .iter()
        .map(|weighted| {
            let particle = &weighted.particle;
            let height = particle.form_factor().height();
            let anchored = match position {
                Position::Inner => 0.5 * (top + bottom) + 0.5 * height,
                Position::Ambient => bottom,
                Position::Substrate => top + height,
            };
            PlacedParticle {
                form_factor: particle.form_factor(),
                sld: particle.material().sld(),
                density: density * weighted.abundance / total_abundance,
                base: anchored - particle.vertical_offset(),
            }
        })
        .collect()
}

/// Splits `[top, bottom]` into `n` equal intervals.
fn split(top: f64, bottom: f64, n: usize) -> impl Iterator<Item = (f64, f64)> {
    let step = (bottom - top) / n as f64;
    let edge = move |k: usize| {
        if k == n {
            bottom
        } else {
            (top + k as f64 * step).min(bottom)
        }
    };
    (0..n).map(move |k| (edge(k), edge(k + 1)))
}
