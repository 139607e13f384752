use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, SldError};
use crate::layer::Layer;
use crate::roughness::Roughness;

/// An ordered stack of layers from the ambient (top) to the substrate
/// (bottom).
///
/// Built by appending layers, then frozen. Profile extraction freezes the
/// stack; any later mutation fails with `InvalidState`.
///
/// Serializes its layers and interfaces only; a deserialized stack is
/// rebuilt layer by layer and starts out mutable.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "MultilayerParams")]
pub struct Multilayer {
    layers: Vec<Layer>,
    /// `interfaces[i]` lies between `layers[i]` and `layers[i + 1]`.
    interfaces: Vec<Roughness>,
    #[serde(skip)]
    frozen: AtomicBool,
}

impl Multilayer {
    /// Empty, mutable stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer below the current stack with a sharp top interface.
    pub fn add_layer(&mut self, layer: Layer) -> Result<()> {
        self.ensure_mutable()?;
        if !self.layers.is_empty() {
            self.interfaces.push(Roughness::sharp());
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Appends a layer whose interface with the previous layer has the given
    /// roughness.
    pub fn add_layer_with_top_roughness(&mut self, layer: Layer, roughness: Roughness) -> Result<()> {
        self.ensure_mutable()?;
        if self.layers.is_empty() {
            return Err(SldError::InvalidState(
                "cannot attach a top roughness to the first layer".to_string(),
            ));
        }
        self.interfaces.push(roughness);
        self.layers.push(layer);
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.is_frozen() {
            return Err(SldError::InvalidState(
                "multilayer is frozen and can no longer be modified".to_string(),
            ));
        }
        Ok(())
    }

    /// Makes the stack read-only. Idempotent.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn number_of_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, i: usize) -> Option<&Layer> {
        self.layers.get(i)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Roughness between layer `i` and `i + 1`, `None` past the last
    /// interface.
    pub fn roughness_at(&self, i: usize) -> Option<Roughness> {
        self.interfaces.get(i).copied()
    }

    /// Combined thickness of all layers between ambient and substrate, in nm.
    pub fn total_thickness(&self) -> f64 {
        let n = self.layers.len();
        if n < 3 {
            return 0.0;
        }
        self.layers[1..n - 1]
            .iter()
            .map(Layer::finite_thickness)
            .sum()
    }

    /// Depth of the top interface of layer `i` (0 for the layer below the
    /// ambient, `-inf` for the ambient itself).
    pub fn layer_top_depth(&self, i: usize) -> Option<f64> {
        if i >= self.layers.len() {
            return None;
        }
        if i == 0 {
            return Some(f64::NEG_INFINITY);
        }
        Some(
            self.layers[1..i]
                .iter()
                .map(Layer::finite_thickness)
                .sum(),
        )
    }
}

#[derive(Deserialize)]
struct MultilayerParams {
    layers: Vec<Layer>,
    #[serde(default)]
    interfaces: Vec<Roughness>,
}

impl TryFrom<MultilayerParams> for Multilayer {
    type Error = SldError;

    /// Missing interfaces are sharp; surplus ones are rejected.
    fn try_from(p: MultilayerParams) -> Result<Self> {
        let expected = p.layers.len().saturating_sub(1);
        if p.interfaces.len() > expected {
            return Err(SldError::InvalidArgument(format!(
                "{} interfaces given for {} layers",
                p.interfaces.len(),
                p.layers.len()
            )));
        }
        let mut multilayer = Multilayer::new();
        let mut interfaces = p.interfaces.into_iter();
        for layer in p.layers {
            if multilayer.is_empty() {
                multilayer.add_layer(layer)?;
            } else {
                let roughness = interfaces.next().unwrap_or_default();
                multilayer.add_layer_with_top_roughness(layer, roughness)?;
            }
        }
        Ok(multilayer)
    }
}

impl Clone for Multilayer {
    /// The clone starts out mutable, even when `self` is frozen.
    fn clone(&self) -> Self {
        Multilayer {
            layers: self.layers.clone(),
            interfaces: self.interfaces.clone(),
            frozen: AtomicBool::new(false),
        }
    }
}
