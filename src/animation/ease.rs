/// Decay curve mapping time since activation (normalized to `[0, 1]`) to a motion weight.
///
/// Unlike the usual easing curves these start at 1 and fall to 0, and are 0 outside the unit
/// interval so a note that has not been activated yet, or has fully settled, stays still.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleCurve {
    /// `(1 - t)^3`
    #[default]
    Cubic,
    /// `(1 - t)^2`
    Quad,
    /// `2^(-10 t)`, forced to 0 at `t = 1`.
    Expo,
}

impl SettleCurve {
    pub fn apply(self, t: f64) -> f64 {
        if !(0.0..=1.0).contains(&t) {
            return 0.0;
        }
        match self {
            Self::Cubic => ease_out_cubic(t),
            Self::Quad => (1.0 - t).powi(2),
            Self::Expo => {
                if t == 1.0 {
                    0.0
                } else {
                    2f64.powf(-10.0 * t)
                }
            }
        }
    }
}

/// `(1 - t)^3` on `[0, 1]`, 0 elsewhere (including NaN).
pub fn ease_out_cubic(t: f64) -> f64 {
    if !(0.0..=1.0).contains(&t) {
        return 0.0;
    }
    (1.0 - t).powi(3)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
