use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SldError {
    /// A numeric parameter is out of its allowed range.
    InvalidArgument(String),
    /// The operation does not fit the current state of the object.
    InvalidState(String),
    /// Particles fill more than the available volume of a slab.
    OverflowCondition {
        layer: usize,
        slab: usize,
        fraction: f64,
    },
}

pub type Result<T> = std::result::Result<T, SldError>;

impl fmt::Display for SldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::OverflowCondition {
                layer,
                slab,
                fraction,
            } => write!(
                f,
                "particle volume fraction {fraction} exceeds 1 in slab {slab} of layer {layer}"
            ),
        }
    }
}

impl std::error::Error for SldError {}

/// Fails with `InvalidArgument` unless `value` is finite and `>= 0`.
pub(crate) fn ensure_non_negative(what: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SldError::InvalidArgument(format!(
            "{what} must be a finite value >= 0, got {value}"
        )));
    }
    Ok(())
}

/// Fails with `InvalidArgument` unless `value` is finite and `> 0`.
pub(crate) fn ensure_positive(what: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SldError::InvalidArgument(format!(
            "{what} must be a finite value > 0, got {value}"
        )));
    }
    Ok(())
}
