//! SLD versus depth for a frozen multilayer.

use log::debug;
use num_complex::Complex64;
use serde::Serialize;

use crate::error::{Result, SldError};
use crate::multilayer::Multilayer;
use crate::options::ProfileOptions;
use crate::slicing::{FractionOverflow, SlicedSample};

/// Lower bound for the number of samples when none is requested.
pub const MIN_DEFAULT_POINTS: usize = 400;

/// Sampled SLD profile. `depths` is strictly increasing and has the same
/// length as `slds`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    /// Depths in nm, zero at the bottom of the ambient layer
    pub depths: Vec<f64>,
    pub slds: Vec<Complex64>,
    /// Slabs whose particle fraction was clamped to 1
    pub overflows: Vec<FractionOverflow>,
}

impl Profile {
    /// Number of sampled depths.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// True when some particle fraction or coverage exceeded 1.
    pub fn has_overflow(&self) -> bool {
        !self.overflows.is_empty()
    }

    /// Drops the diagnostics and returns `(depths, slds)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<Complex64>) {
        (self.depths, self.slds)
    }
}

/// Samples the SLD profile of `multilayer` over `[z_min, z_max]`.
///
/// Omitted limits and point count fall back to the defaults of
/// [`extract_with`]. The multilayer is frozen by this call.
pub fn extract(
    multilayer: &Multilayer,
    z_min: Option<f64>,
    z_max: Option<f64>,
    n_points: Option<usize>,
) -> Result<Profile> {
    let options = ProfileOptions {
        z_min,
        z_max,
        n_points,
        ..ProfileOptions::default()
    };
    extract_with(multilayer, &options)
}

/// Samples the SLD profile of `multilayer` as configured by `options`.
///
/// Missing limits come from [`SlicedSample::default_limits`]; a missing point
/// count becomes `max(400, 4 * number_of_slabs)`. The multilayer is frozen
/// by this call, even when it fails.
///
/// # Errors
/// * `InvalidArgument` - fewer than 2 points, non-finite or unordered limits,
///   a range too narrow to hold `n_points` distinct depths, or fewer than 2
///   layers
/// * `OverflowCondition` - particle fraction above 1 with
///   `strict_fractions` set
pub fn extract_with(multilayer: &Multilayer, options: &ProfileOptions) -> Result<Profile> {
    multilayer.freeze();

    if let Some(n) = options.n_points {
        check_point_count(n)?;
    }
    for limit in [options.z_min, options.z_max].into_iter().flatten() {
        if !limit.is_finite() {
            return Err(SldError::InvalidArgument(format!(
                "depth limits must be finite, got {limit}"
            )));
        }
    }

    let sample = SlicedSample::new(multilayer)?;
    if options.strict_fractions {
        if let Some(&overflow) = sample.overflows().first() {
            return Err(overflow.into());
        }
    }

    let (default_min, default_max) = sample.default_limits();
    let z_min = options.z_min.unwrap_or(default_min);
    let z_max = options.z_max.unwrap_or(default_max);
    if z_min >= z_max {
        return Err(SldError::InvalidArgument(format!(
            "z_min ({z_min}) must be smaller than z_max ({z_max})"
        )));
    }
    let n_points = options
        .n_points
        .unwrap_or_else(|| MIN_DEFAULT_POINTS.max(4 * sample.slabs().len()));
    debug!("sampling {n_points} points over [{z_min}, {z_max}] nm");

    let depths = linspace(z_min, z_max, n_points);
    if let Some(w) = depths.windows(2).find(|w| w[0] >= w[1]) {
        return Err(SldError::InvalidArgument(format!(
            "{n_points} points over [{z_min}, {z_max}] nm repeat depth {}; \
             widen the range or use fewer points",
            w[0]
        )));
    }
    let slds = depths
        .iter()
        .map(|&z| sample.sld_at(z, options.kernel))
        .collect();

    Ok(Profile {
        depths,
        slds,
        overflows: sample.overflows().to_vec(),
    })
}

/// Default `(z_min, z_max)` for `multilayer` without freezing it.
pub fn default_limits(multilayer: &Multilayer) -> Result<(f64, f64)> {
    Ok(SlicedSample::new(multilayer)?.default_limits())
}

impl Multilayer {
    /// Shorthand for [`extract_with`].
    pub fn material_profile(&self, options: &ProfileOptions) -> Result<Profile> {
        extract_with(self, options)
    }
}

fn check_point_count(n: usize) -> Result<()> {
    if n < 2 {
        return Err(SldError::InvalidArgument(format!(
            "at least 2 sample points are required, got {n}"
        )));
    }
    Ok(())
}

/// `n` evenly spaced values from `start` to `end`, both included.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n)
        .map(|i| {
            if i == n - 1 {
                end
            } else {
                start + i as f64 * step
            }
        })
        .collect()
}
