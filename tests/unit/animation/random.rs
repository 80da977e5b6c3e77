use super::*;
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn exclude_middle_stays_in_both_bands_and_is_balanced() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut negative = 0usize;
    for _ in 0..10_000 {
        let v = uniform_exclude_middle(&mut rng, 1.0, 0.7);
        assert!(
            (-1.0..=-0.7).contains(&v) || (0.7..=1.0).contains(&v),
            "{v} fell in the excluded band"
        );
        if v < 0.0 {
            negative += 1;
        }
    }
    // Binomial(10_000, 0.5) has sd 50; 400 is 8 sd away.
    assert!((4_600..=5_400).contains(&negative), "negative = {negative}");
}

#[test]
fn exclude_middle_normalizes_argument_order_and_sign() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..1_000 {
        let v = uniform_exclude_middle(&mut rng, -0.7, -1.0);
        assert!(v.abs() >= 0.7 && v.abs() <= 1.0);
    }
}

#[test]
fn uniform_covers_symmetric_range() {
    let mut rng = StdRng::seed_from_u64(2);
    let (mut lo, mut hi) = (f64::MAX, f64::MIN);
    for _ in 0..5_000 {
        let v = uniform(&mut rng, 3.0);
        assert!((-3.0..3.0).contains(&v));
        lo = lo.min(v);
        hi = hi.max(v);
    }
    assert!(lo < -2.5 && hi > 2.5);
}

#[test]
fn normal_is_clamped_to_amplitude() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..5_000 {
        let v = normal_clamped(&mut rng, 0.5, 4.0);
        assert!((-0.5..=0.5).contains(&v));
    }
}

#[test]
fn normal_has_roughly_requested_spread() {
    let mut rng = StdRng::seed_from_u64(4);
    let n = 20_000;
    let samples: Vec<f64> = (0..n).map(|_| normal_clamped(&mut rng, 1e9, 4.0)).collect();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    assert!(mean.abs() < 0.1, "mean = {mean}");
    assert!((var - 4.0).abs() < 0.3, "var = {var}");
}

#[test]
fn zero_variance_yields_zero_noise() {
    let mut rng = StdRng::seed_from_u64(5);
    assert_eq!(normal_clamped(&mut rng, 10.0, 0.0), 0.0);
}
