//! Random variates used by the note animation.
//!
//! Every sampler takes the generator explicitly so callers control seeding.

use rand::Rng;

/// Uniform in `[-range, range)`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, range: f64) -> f64 {
    (rng.random::<f64>() * 2.0 - 1.0) * range
}

/// Uniform over `[-a, -b) U [b, a)` with equal weight on both sides.
///
/// Arguments are taken by magnitude and swapped if `a < b`.
pub fn uniform_exclude_middle<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    if a <= b {
        std::mem::swap(&mut a, &mut b);
    }
    let r = rng.random::<f64>();
    if r < 0.5 {
        -a + r * 2.0 * (a - b)
    } else {
        b + (r - 0.5) * 2.0 * (a - b)
    }
}

/// Approximately normal with mean 0, clamped to `[-max_amplitude, max_amplitude]`.
///
/// Sums 12 uniforms (Irwin-Hall) so the standard score needs no transcendental functions.
pub fn normal_clamped<R: Rng + ?Sized>(rng: &mut R, max_amplitude: f64, variance: f64) -> f64 {
    let std_dev = variance.max(0.0).sqrt();
    let sum: f64 = (0..12).map(|_| rng.random::<f64>()).sum();
    let max_amplitude = max_amplitude.abs();
    ((sum - 6.0) * std_dev).clamp(-max_amplitude, max_amplitude)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/random.rs"]
mod tests;
