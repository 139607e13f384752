use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MaterialData {
    name: String,
    sld: Complex64,
}

/// A named material with a complex scattering length density.
///
/// The real part is the scattering density, the imaginary part the
/// absorption. Values are used as given; the reference sample data is in Å^-2.
///
/// Clones share one allocation. Two materials created separately stay distinct
/// even when their name and SLD agree, see [`Material::same_as`]. Serialized
/// as `{ "name", "sld": [re, im] }`; every deserialized occurrence is a new
/// material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "MaterialData", into = "MaterialData")]
pub struct Material {
    inner: Arc<MaterialData>,
}

impl Material {
    /// Creates a material from the real and imaginary parts of its SLD.
    pub fn by_sld(name: impl Into<String>, sld_real: f64, sld_imag: f64) -> Self {
        Material {
            inner: Arc::new(MaterialData {
                name: name.into(),
                sld: Complex64::new(sld_real, sld_imag),
            }),
        }
    }

    /// Material with zero SLD.
    pub fn vacuum() -> Self {
        Self::by_sld("Vacuum", 0.0, 0.0)
    }

    /// Label given at creation; not required to be unique.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Complex SLD, real part first.
    pub fn sld(&self) -> Complex64 {
        self.inner.sld
    }

    /// True when both handles refer to the same material definition.
    pub fn same_as(&self, other: &Material) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<MaterialData> for Material {
    fn from(data: MaterialData) -> Self {
        Material {
            inner: Arc::new(data),
        }
    }
}

impl From<Material> for MaterialData {
    fn from(material: Material) -> Self {
        MaterialData::clone(&material.inner)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sld = self.sld();
        write!(f, "{} (SLD {:e}{:+e}i)", self.name(), sld.re, sld.im)
    }
}
