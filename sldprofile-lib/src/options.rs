use serde::{Deserialize, Serialize};

use crate::roughness::Kernel;

/// Settings for [`extract_with`](crate::extract_with).
///
/// Every field is optional when deserializing; missing limits and point count
/// are derived from the sliced sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    /// Smallest sampled depth in nm
    pub z_min: Option<f64>,

    /// Largest sampled depth in nm
    pub z_max: Option<f64>,

    /// Number of samples, at least 2
    pub n_points: Option<usize>,

    /// Smoothing applied across rough interfaces
    pub kernel: Kernel,

    /// Fail with `OverflowCondition` instead of clamping particle fractions
    pub strict_fractions: bool,
}

impl ProfileOptions {
    /// Default limits and point count, erf smoothing, clamped overflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples `[z_min, z_max]` in nm.
    pub fn with_limits(mut self, z_min: f64, z_max: f64) -> Self {
        self.z_min = Some(z_min);
        self.z_max = Some(z_max);
        self
    }

    /// Fixes the number of samples; fewer than 2 is rejected at extraction.
    pub fn with_n_points(mut self, n_points: usize) -> Self {
        self.n_points = Some(n_points);
        self
    }

    /// Selects the step profile used across rough interfaces.
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// With `true`, any particle overflow fails the extraction.
    pub fn strict(mut self, strict_fractions: bool) -> Self {
        self.strict_fractions = strict_fractions;
        self
    }
}
