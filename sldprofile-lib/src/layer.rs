use serde::{Deserialize, Serialize};

use crate::error::{Result, SldError, ensure_non_negative};
use crate::layout::ParticleLayout;
use crate::material::Material;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Thickness {
    /// Thickness in nm.
    Finite(f64),
    SemiInfinite,
}

/// A homogeneous slab of one material, optionally hosting particles.
///
/// The first and last layer of a [`Multilayer`](crate::Multilayer) are
/// treated as semi-infinite whatever their thickness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LayerParams")]
pub struct Layer {
    material: Material,
    thickness: Thickness,
    layout: Option<ParticleLayout>,
    slice_count: usize,
}

impl Layer {
    /// Creates a layer of finite thickness in nm.
    pub fn new(material: Material, thickness: f64) -> Result<Self> {
        ensure_non_negative("layer thickness", thickness)?;
        Ok(Self::with_thickness(material, Thickness::Finite(thickness)))
    }

    /// Creates a layer without a thickness, for the ambient or substrate.
    pub fn semi_infinite(material: Material) -> Self {
        Self::with_thickness(material, Thickness::SemiInfinite)
    }

    fn with_thickness(material: Material, thickness: Thickness) -> Self {
        Layer {
            material,
            thickness,
            layout: None,
            slice_count: 1,
        }
    }

    /// Attaches a particle layout. A layer hosts at most one layout; a second
    /// call fails with `InvalidState` and keeps the first.
    pub fn add_layout(&mut self, layout: ParticleLayout) -> Result<()> {
        if self.layout.is_some() {
            return Err(SldError::InvalidState(format!(
                "layer of {} already has a particle layout",
                self.material.name()
            )));
        }
        self.layout = Some(layout);
        Ok(())
    }

    /// Sets how many equal slabs the layer is cut into when profiling.
    pub fn set_slice_count(&mut self, n: usize) -> Result<()> {
        if n < 1 {
            return Err(SldError::InvalidArgument(
                "slice count must be at least 1".to_string(),
            ));
        }
        self.slice_count = n;
        Ok(())
    }

    /// Builder form of [`Layer::add_layout`].
    pub fn with_layout(mut self, layout: ParticleLayout) -> Result<Self> {
        self.add_layout(layout)?;
        Ok(self)
    }

    /// Builder form of [`Layer::set_slice_count`].
    pub fn with_slice_count(mut self, n: usize) -> Result<Self> {
        self.set_slice_count(n)?;
        Ok(self)
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn thickness(&self) -> Thickness {
        self.thickness
    }

    /// Finite thickness in nm, zero for a semi-infinite layer.
    pub fn finite_thickness(&self) -> f64 {
        match self.thickness {
            Thickness::Finite(t) => t,
            Thickness::SemiInfinite => 0.0,
        }
    }

    /// The attached particle layout, if any.
    pub fn layout(&self) -> Option<&ParticleLayout> {
        self.layout.as_ref()
    }

    /// Number of slabs the layer is cut into, 1 unless set.
    pub fn slice_count(&self) -> usize {
        self.slice_count
    }
}

#[derive(Deserialize)]
struct LayerParams {
    material: Material,
    thickness: Thickness,
    #[serde(default)]
    layout: Option<ParticleLayout>,
    #[serde(default = "single_slice")]
    slice_count: usize,
}

fn single_slice() -> usize {
    1
}

impl TryFrom<LayerParams> for Layer {
    type Error = SldError;

    fn try_from(p: LayerParams) -> Result<Self> {
        let mut layer = match p.thickness {
            Thickness::Finite(t) => Layer::new(p.material, t)?,
            Thickness::SemiInfinite => Layer::semi_infinite(p.material),
        };
        if let Some(layout) = p.layout {
            layer.add_layout(layout)?;
        }
        layer.set_slice_count(p.slice_count)?;
        Ok(layer)
    }
}
