use super::*;

const CURVES: [SettleCurve; 3] = [SettleCurve::Cubic, SettleCurve::Quad, SettleCurve::Expo];

#[test]
fn ease_out_cubic_endpoints() {
    assert_eq!(ease_out_cubic(0.0), 1.0);
    assert_eq!(ease_out_cubic(1.0), 0.0);
    assert_eq!(ease_out_cubic(0.5), 0.125);
}

#[test]
fn ease_out_cubic_is_zero_outside_unit_interval() {
    for t in [-1.0, -1e-9, 1.0 + 1e-9, 2.0, f64::INFINITY, f64::NAN] {
        assert_eq!(ease_out_cubic(t), 0.0, "t = {t}");
    }
}

#[test]
fn ease_out_cubic_is_non_increasing() {
    let mut prev = ease_out_cubic(0.0);
    for i in 1..=1000 {
        let cur = ease_out_cubic(f64::from(i) / 1000.0);
        assert!(cur <= prev);
        prev = cur;
    }
}

#[test]
fn every_curve_starts_at_one_and_ends_at_zero() {
    for curve in CURVES {
        assert_eq!(curve.apply(0.0), 1.0, "{curve:?}");
        assert_eq!(curve.apply(1.0), 0.0, "{curve:?}");
        assert_eq!(curve.apply(-0.5), 0.0, "{curve:?}");
        assert_eq!(curve.apply(1.5), 0.0, "{curve:?}");
    }
}

#[test]
fn every_curve_decays_monotonically() {
    for curve in CURVES {
        let a = curve.apply(0.25);
        let b = curve.apply(0.5);
        let c = curve.apply(0.75);
        assert!(a > b && b > c, "{curve:?}");
    }
}

#[test]
fn cubic_curve_matches_free_function() {
    for i in 0..=10 {
        let t = f64::from(i) / 10.0;
        assert_eq!(SettleCurve::Cubic.apply(t), ease_out_cubic(t));
    }
}
