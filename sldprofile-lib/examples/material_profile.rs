//! SLD profile of cones on a Ti/Ni multilayer, printed as
//! `depth  Re(SLD)  Im(SLD)` columns.

use sldprofile::units::{ANGSTROM, DEG, NM};
use sldprofile::{
    FormFactor, InterferenceFunction, Lattice2D, Layer, Material, Multilayer, Particle,
    ParticleLayout, Result, Roughness, extract,
};

fn get_sample() -> Result<Multilayer> {
    let m_ambient = Material::by_sld("Ambient", 0.0, 0.0);
    let m_ti = Material::by_sld("Ti", -1.9493e-06, 0.0);
    let m_ni = Material::by_sld("Ni", 9.4245e-06, 0.0);
    let m_particle = Material::by_sld("Particle", 5e-6, 0.0);
    let m_substrate = Material::by_sld("SiSubstrate", 2.0704e-06, 0.0);

    let mut ambient_layer = Layer::semi_infinite(m_ambient);
    let ti_layer = Layer::new(m_ti, 30.0 * ANGSTROM)?;
    let ni_layer = Layer::new(m_ni, 70.0 * ANGSTROM)?;
    let substrate_layer = Layer::semi_infinite(m_substrate);

    let roughness = Roughness::new(5.0 * ANGSTROM, 0.5, 10.0 * ANGSTROM)?;

    let ff = FormFactor::cone(5.0 * NM, 10.0 * NM, 75.0 * DEG)?;
    let mut layout = ParticleLayout::new();
    layout.add_particle(Particle::new(m_particle, ff)?);
    let lattice = Lattice2D::square(10.0 * NM, 0.0)?;
    layout.set_interference(InterferenceFunction::lattice_2d(lattice))?;
    ambient_layer.add_layout(layout)?;
    ambient_layer.set_slice_count(20)?;

    let mut multi_layer = Multilayer::new();
    multi_layer.add_layer(ambient_layer)?;
    for _ in 0..2 {
        multi_layer.add_layer_with_top_roughness(ti_layer.clone(), roughness)?;
        multi_layer.add_layer_with_top_roughness(ni_layer.clone(), roughness)?;
    }
    multi_layer.add_layer(substrate_layer)?;
    Ok(multi_layer)
}

fn main() -> Result<()> {
    let sample = get_sample()?;
    let profile = extract(&sample, None, None, None)?;
    for overflow in &profile.overflows {
        eprintln!("warning: particle fraction {} clamped in layer {}", overflow.fraction, overflow.layer);
    }
    for (z, sld) in profile.depths.iter().zip(&profile.slds) {
        println!("{z:10.4} {:14.6e} {:14.6e}", sld.re, sld.im);
    }
    Ok(())
}
