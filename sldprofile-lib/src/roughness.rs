//! Interfacial roughness and the smoothing kernels applied across rough
//! interfaces.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;
use std::f64::consts::{FRAC_2_PI, SQRT_2};

use crate::error::{Result, SldError, ensure_non_negative};

/// Roughness of the interface between two adjacent layers.
///
/// The default value is a sharp interface. Deserialization goes through
/// [`Roughness::new`]; omitted fields default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RoughnessParams")]
pub struct Roughness {
    sigma: f64,
    hurst: f64,
    correlation_length: f64,
}

impl Roughness {
    /// # Arguments
    /// * `sigma` - RMS amplitude in nm
    /// * `hurst` - Smoothness exponent in `[0, 1]`
    /// * `correlation_length` - Lateral correlation length in nm
    pub fn new(sigma: f64, hurst: f64, correlation_length: f64) -> Result<Self> {
        ensure_non_negative("roughness sigma", sigma)?;
        ensure_non_negative("correlation length", correlation_length)?;
        if !(0.0..=1.0).contains(&hurst) {
            return Err(SldError::InvalidArgument(format!(
                "hurst parameter must lie in [0, 1], got {hurst}"
            )));
        }
        Ok(Roughness {
            sigma,
            hurst,
            correlation_length,
        })
    }

    /// Interface without roughness.
    pub fn sharp() -> Self {
        Self::default()
    }

    /// RMS amplitude in nm; the width of the smoothing kernel.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn hurst(&self) -> f64 {
        self.hurst
    }

    pub fn correlation_length(&self) -> f64 {
        self.correlation_length
    }

    /// True for `sigma == 0`, whatever the other parameters.
    pub fn is_sharp(&self) -> bool {
        self.sigma == 0.0
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RoughnessParams {
    sigma: f64,
    hurst: f64,
    correlation_length: f64,
}

impl TryFrom<RoughnessParams> for Roughness {
    type Error = SldError;

    fn try_from(p: RoughnessParams) -> Result<Self> {
        Roughness::new(p.sigma, p.hurst, p.correlation_length)
    }
}

/// Shape of the smooth step that replaces a sharp jump at a rough interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    /// Gaussian CDF of width sigma.
    #[default]
    Erf,
    /// `tanh` step with the same slope at the interface as a Gaussian CDF.
    Tanh,
}

impl Kernel {
    /// Fraction of the lower medium at `x` sigmas below the interface.
    ///
    /// Rises monotonically from 0 to 1 with value 0.5 at `x = 0`.
    pub fn transition(self, x: f64) -> f64 {
        match self {
            Kernel::Erf => 0.5 * (1.0 + erf(x / SQRT_2)),
            Kernel::Tanh => 0.5 * (1.0 + (FRAC_2_PI.sqrt() * x).tanh()),
        }
    }
}
