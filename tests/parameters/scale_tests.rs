//! Tests for scale transformations

use approx::assert_relative_eq;
use petab_rs::parameters::scale::{broadcast_scale, broadcast_unscale, map_scale, map_unscale, scale, unscale};
use petab_rs::parameters::Scale;
use petab_rs::PetabError;

#[test]
fn test_round_trip_all_scales() {
    for s in [Scale::Lin, Scale::Log, Scale::Log10] {
        for &x in &[1e-6, 0.1, 1.0, 3.7, 250.0, 1e8] {
            assert_relative_eq!(s.unscale(s.scale(x)), x, max_relative = 1e-12);
        }
    }
}

#[test]
fn test_string_tags() {
    assert_relative_eq!(scale(100.0, "log10").unwrap(), 2.0);
    assert_relative_eq!(scale(std::f64::consts::E, "log").unwrap(), 1.0);
    assert_relative_eq!(unscale(2.0, "log10").unwrap(), 100.0);
    assert_relative_eq!(unscale(-4.0, "lin").unwrap(), -4.0);

    match scale(1.0, "sqrt") {
        Err(PetabError::InvalidScale(tag)) => assert_eq!(tag, "sqrt"),
        other => panic!("Expected InvalidScale, got {other:?}"),
    }
    assert!(unscale(1.0, "LOG").is_err());
}

#[test]
fn test_elementwise_mapping() {
    let scales = [Scale::Lin, Scale::Log10, Scale::Log];
    let scaled = map_scale(&[5.0, 1000.0, 1.0], &scales).unwrap();
    assert_relative_eq!(scaled[0], 5.0);
    assert_relative_eq!(scaled[1], 3.0, epsilon = 1e-12);
    assert_relative_eq!(scaled[2], 0.0);

    let restored = map_unscale(&scaled, &scales).unwrap();
    assert_relative_eq!(restored[1], 1000.0, max_relative = 1e-12);

    match map_scale(&[1.0, 2.0], &scales) {
        Err(PetabError::ShapeMismatch { expected, found }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 3);
        }
        other => panic!("Expected ShapeMismatch, got {other:?}"),
    }
}

#[test]
fn test_broadcast_single_scale() {
    let scaled = broadcast_scale(&[10.0, 100.0], Scale::Log10);
    assert_relative_eq!(scaled[0], 1.0);
    assert_relative_eq!(scaled[1], 2.0);
    let restored = broadcast_unscale(&scaled, Scale::Log10);
    assert_relative_eq!(restored[1], 100.0, max_relative = 1e-12);
}
