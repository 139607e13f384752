//! Depth-resolved scattering length density (SLD) profiles of layered samples
//! that may host particles.
//!
//! A [`Multilayer`] is assembled from [`Layer`]s, optional [`Roughness`]
//! between them and [`ParticleLayout`]s inside them, then handed to
//! [`extract`], which slices the stack into homogeneous slabs and samples the
//! smoothed SLD along the depth axis.

pub mod error;
pub mod formfactor;
pub mod interference;
pub mod layer;
pub mod layout;
pub mod material;
pub mod multilayer;
pub mod options;
pub mod profile;
pub mod roughness;
pub mod slicing;
pub mod units;

pub use error::{Result, SldError};
pub use formfactor::FormFactor;
pub use interference::{InterferenceFunction, Lattice2D};
pub use layer::{Layer, Thickness};
pub use layout::{Particle, ParticleLayout, WeightedParticle};
pub use material::Material;
pub use multilayer::Multilayer;
pub use options::ProfileOptions;
pub use profile::{Profile, default_limits, extract, extract_with};
pub use roughness::{Kernel, Roughness};
pub use slicing::{Boundary, FractionOverflow, Slab, SlicedSample};
pub use num_complex::{self, Complex64};
