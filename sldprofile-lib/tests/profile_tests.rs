use approx::assert_relative_eq;
use sldprofile::units::{ANGSTROM, DEG, NM};
use sldprofile::{
    Complex64, FormFactor, InterferenceFunction, Kernel, Lattice2D, Layer, Material, Multilayer,
    Particle, ParticleLayout, ProfileOptions, Roughness, SldError, default_limits, extract,
    extract_with,
};

fn two_layer_stack(roughness: Option<Roughness>) -> Multilayer {
    let mut ml = Multilayer::new();
    ml.add_layer(Layer::semi_infinite(Material::by_sld("Ambient", 0.0, 0.0)))
        .unwrap();
    let substrate = Layer::semi_infinite(Material::by_sld("Substrate", 2.07e-6, 0.0));
    match roughness {
        Some(r) => ml.add_layer_with_top_roughness(substrate, r).unwrap(),
        None => ml.add_layer(substrate).unwrap(),
    }
    ml
}

/// Ambient / Ti 3 nm / Ni 7 nm / Si, every interface with roughness `sigma`.
fn ti_ni_stack(sigma: f64) -> Multilayer {
    let roughness = Roughness::new(sigma, 0.5, 1.0).unwrap();
    let mut ml = Multilayer::new();
    ml.add_layer(Layer::semi_infinite(Material::vacuum())).unwrap();
    ml.add_layer_with_top_roughness(
        Layer::new(Material::by_sld("Ti", -1.9493e-6, 0.0), 3.0).unwrap(),
        roughness,
    )
    .unwrap();
    ml.add_layer_with_top_roughness(
        Layer::new(Material::by_sld("Ni", 9.4245e-6, 0.0), 7.0)
            .unwrap()
            .with_slice_count(20)
            .unwrap(),
        roughness,
    )
    .unwrap();
    ml.add_layer_with_top_roughness(
        Layer::semi_infinite(Material::by_sld("Si", 2.0704e-6, 0.0)),
        roughness,
    )
    .unwrap();
    ml
}

/// The reference sample: cones on a square lattice above a Ti/Ni bilayer
/// repeated twice.
fn reference_sample() -> Multilayer {
    let m_ambient = Material::by_sld("Ambient", 0.0, 0.0);
    let m_ti = Material::by_sld("Ti", -1.9493e-06, 0.0);
    let m_ni = Material::by_sld("Ni", 9.4245e-06, 0.0);
    let m_particle = Material::by_sld("Particle", 5e-6, 0.0);
    let m_substrate = Material::by_sld("SiSubstrate", 2.0704e-06, 0.0);

    let ti_layer = Layer::new(m_ti, 30.0 * ANGSTROM).unwrap();
    let ni_layer = Layer::new(m_ni, 70.0 * ANGSTROM).unwrap();
    let roughness = Roughness::new(5.0 * ANGSTROM, 0.5, 10.0 * ANGSTROM).unwrap();

    let ff = FormFactor::cone(5.0 * NM, 10.0 * NM, 75.0 * DEG).unwrap();
    let mut layout = ParticleLayout::new();
    layout.add_particle(Particle::new(m_particle, ff).unwrap());
    let lattice = Lattice2D::square(10.0 * NM, 0.0).unwrap();
    layout
        .set_interference(InterferenceFunction::lattice_2d(lattice))
        .unwrap();

    let mut ambient_layer = Layer::semi_infinite(m_ambient);
    ambient_layer.add_layout(layout).unwrap();
    ambient_layer.set_slice_count(20).unwrap();

    let mut ml = Multilayer::new();
    ml.add_layer(ambient_layer).unwrap();
    for _ in 0..2 {
        ml.add_layer_with_top_roughness(ti_layer.clone(), roughness)
            .unwrap();
        ml.add_layer_with_top_roughness(ni_layer.clone(), roughness)
            .unwrap();
    }
    ml.add_layer(Layer::semi_infinite(m_substrate)).unwrap();
    ml
}

#[test]
fn test_two_layer_step() {
    let ml = two_layer_stack(None);
    let profile = extract(&ml, Some(-5.0), Some(5.0), Some(3)).unwrap();
    assert_eq!(profile.depths, vec![-5.0, 0.0, 5.0]);
    assert_eq!(
        profile.slds,
        vec![
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(2.07e-6, 0.0),
        ]
    );
    assert!(!profile.has_overflow());

    let (depths, slds) = profile.into_parts();
    assert_eq!(depths.len(), slds.len());
}

#[test]
fn test_sharp_stack_is_exact_inside_layers() {
    let ml = ti_ni_stack(0.0);
    let profile = extract(&ml, Some(-5.0), Some(15.0), Some(301)).unwrap();
    for (&z, &sld) in profile.depths.iter().zip(&profile.slds) {
        if [0.0, 3.0, 10.0].iter().any(|b| (z - b).abs() < 1e-9) {
            continue;
        }
        let expected = if z < 0.0 {
            0.0
        } else if z < 3.0 {
            -1.9493e-6
        } else if z < 10.0 {
            9.4245e-6
        } else {
            2.0704e-6
        };
        assert_eq!(sld, Complex64::new(expected, 0.0), "at depth {z}");
    }
}

#[test]
fn test_boundary_belongs_to_upper_layer() {
    let ml = ti_ni_stack(0.0);
    let profile = extract(&ml, Some(0.0), Some(3.0), Some(2)).unwrap();
    assert_eq!(profile.slds[0], Complex64::new(0.0, 0.0));
    assert_eq!(profile.slds[1], Complex64::new(-1.9493e-6, 0.0));
}

#[test]
fn test_extraction_is_repeatable() {
    let ml = reference_sample();
    let first = extract(&ml, None, None, Some(777)).unwrap();
    let second = extract(&ml, None, None, Some(777)).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.slds.iter().zip(&second.slds) {
        assert_eq!(a.re.to_bits(), b.re.to_bits());
        assert_eq!(a.im.to_bits(), b.im.to_bits());
    }
    for (a, b) in first.depths.iter().zip(&second.depths) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_depths_increase_and_lengths_match() {
    let ml = reference_sample();
    for n in [2, 3, 17, 400, 1001] {
        let profile = extract(&ml, None, None, Some(n)).unwrap();
        assert_eq!(profile.depths.len(), n);
        assert_eq!(profile.slds.len(), n);
        assert!(profile.depths.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_vanishing_roughness_converges_to_step() {
    let sharp = extract(&ti_ni_stack(0.0), Some(-4.3), Some(21.7), Some(50)).unwrap();
    let rough = extract(&ti_ni_stack(1e-6), Some(-4.3), Some(21.7), Some(50)).unwrap();
    for (a, b) in sharp.slds.iter().zip(&rough.slds) {
        assert!((a - b).norm() < 1e-15, "{a} vs {b}");
    }

    // a wider interface deviates from the step near the boundary
    let wide = extract(&ti_ni_stack(1.0), Some(-4.3), Some(21.7), Some(50)).unwrap();
    let max_dev = sharp
        .slds
        .iter()
        .zip(&wide.slds)
        .map(|(a, b)| (a - b).norm())
        .fold(0.0, f64::max);
    assert!(max_dev > 1e-7, "max deviation {max_dev}");
}

#[test]
fn test_rough_interface_midpoint() {
    let ml = two_layer_stack(Some(Roughness::new(0.5, 0.5, 10.0).unwrap()));
    for kernel in [Kernel::Erf, Kernel::Tanh] {
        let options = ProfileOptions::new()
            .with_limits(-1.0, 1.0)
            .with_n_points(3)
            .with_kernel(kernel);
        let profile = extract_with(&ml, &options).unwrap();
        assert_relative_eq!(profile.slds[1].re, 1.035e-6, max_relative = 1e-12);
        assert!(profile.slds[0].re > 0.0 && profile.slds[0].re < 1.035e-6);
        assert!(profile.slds[2].re > 1.035e-6 && profile.slds[2].re < 2.07e-6);
    }

    // one sigma below the interface: Gaussian CDF vs tanh step
    let at = |kernel| {
        let options = ProfileOptions::new()
            .with_limits(-0.5, 0.5)
            .with_n_points(2)
            .with_kernel(kernel);
        extract_with(&ml, &options).unwrap().slds[1].re
    };
    assert_relative_eq!(at(Kernel::Erf), 2.07e-6 * 0.841_344_746, max_relative = 1e-8);
    assert!(at(Kernel::Tanh) < at(Kernel::Erf));
}

#[test]
fn test_default_limits_and_points() {
    let ml = reference_sample();
    let (z_min, z_max) = default_limits(&ml).unwrap();
    assert!(!ml.is_frozen());
    assert_relative_eq!(z_min, -11.5, epsilon = 1e-9);
    assert_relative_eq!(z_max, 21.5, epsilon = 1e-9);

    let profile = extract(&ml, None, None, None).unwrap();
    assert_eq!(profile.len(), 400);
    assert_eq!(profile.depths[0], z_min);
    assert_eq!(profile.depths[399], z_max);

    let ml = two_layer_stack(Some(Roughness::new(3.0, 0.5, 10.0).unwrap()));
    assert_eq!(default_limits(&ml).unwrap(), (-15.0, 15.0));
    let ml = two_layer_stack(None);
    assert_eq!(default_limits(&ml).unwrap(), (-10.0, 10.0));
}

#[test]
fn test_one_sided_limits() {
    let ml = two_layer_stack(None);
    let profile = extract(&ml, Some(-2.0), None, Some(5)).unwrap();
    assert_eq!(profile.depths[0], -2.0);
    assert_eq!(profile.depths[4], 10.0);

    let err = extract(&ml, Some(20.0), None, Some(5)).unwrap_err();
    assert!(matches!(err, SldError::InvalidArgument(_)));
}

#[test]
fn test_reference_sample_profile() {
    let ml = reference_sample();
    assert_eq!(ml.number_of_layers(), 6);
    assert_relative_eq!(ml.total_thickness(), 20.0, epsilon = 1e-12);

    let profile = extract(&ml, None, None, None).unwrap();
    assert!(!profile.has_overflow());

    // pure ambient above the cone tips, pure substrate far below
    assert!(profile.slds[0].norm() < 1e-20);
    assert_relative_eq!(profile.slds[399].re, 2.0704e-6, max_relative = 1e-12);

    // cones raise the SLD above the surface, more so near their base
    let at = |depth: f64| {
        let i = profile
            .depths
            .iter()
            .position(|&z| z >= depth)
            .unwrap();
        profile.slds[i].re
    };
    let near_tip = at(-9.0);
    let near_base = at(-1.5);
    assert!(near_tip > 0.0);
    assert!(near_base > near_tip);
    assert!(near_base < 5e-6);

    // Ni exceeds Ti inside the first bilayer
    assert!(at(6.5) > at(1.5));
}

#[test]
fn test_invalid_arguments() {
    let ml = two_layer_stack(None);
    for (z_min, z_max, n) in [
        (Some(-5.0), Some(5.0), Some(1)),
        (Some(-5.0), Some(5.0), Some(0)),
        (Some(5.0), Some(-5.0), Some(10)),
        (Some(1.0), Some(1.0), Some(10)),
        (Some(f64::NAN), Some(1.0), Some(10)),
        (Some(-1.0), Some(f64::INFINITY), Some(10)),
    ] {
        let err = extract(&ml, z_min, z_max, n).unwrap_err();
        assert!(
            matches!(err, SldError::InvalidArgument(_)),
            "{z_min:?} {z_max:?} {n:?} gave {err}"
        );
    }
}

#[test]
fn test_range_too_narrow_for_points() {
    let ml = two_layer_stack(None);
    let err = extract(&ml, Some(1e6), Some(1e6 + 1e-9), Some(100)).unwrap_err();
    assert!(matches!(err, SldError::InvalidArgument(_)), "got {err}");

    // the same range still resolves two points
    let profile = extract(&ml, Some(1e6), Some(1e6 + 1e-9), Some(2)).unwrap();
    assert!(profile.depths[0] < profile.depths[1]);
}

#[test]
fn test_too_few_layers() {
    let empty = Multilayer::new();
    assert!(matches!(
        extract(&empty, None, None, None),
        Err(SldError::InvalidArgument(_))
    ));

    let mut single = Multilayer::new();
    single
        .add_layer(Layer::semi_infinite(Material::vacuum()))
        .unwrap();
    assert!(matches!(
        extract(&single, Some(-1.0), Some(1.0), Some(10)),
        Err(SldError::InvalidArgument(_))
    ));
}

#[test]
fn test_concurrent_extraction() {
    let ml = reference_sample();
    let serial = extract(&ml, None, None, Some(500)).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| extract(&ml, None, None, Some(500)).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), serial);
        }
    });
}

#[test]
fn test_options_from_json() {
    let options: ProfileOptions =
        serde_json::from_str(r#"{"n_points": 50, "kernel": "tanh"}"#).unwrap();
    assert_eq!(options.n_points, Some(50));
    assert_eq!(options.kernel, Kernel::Tanh);
    assert_eq!(options.z_min, None);
    assert!(!options.strict_fractions);

    let defaults: ProfileOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, ProfileOptions::default());

    let ml = two_layer_stack(None);
    let profile = ml.material_profile(&options).unwrap();
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["depths"].as_array().unwrap().len(), 50);
}
