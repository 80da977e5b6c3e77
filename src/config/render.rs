use std::path::Path;

use crate::animation::ease::SettleCurve;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{MidirollError, MidirollResult};

/// How the per-frame rotation of an active note is scaled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// Shorter notes rotate proportionally more.
    #[default]
    Dynamic,
    /// Same angle regardless of note length.
    Fixed,
}

/// How the activation offset of an active note is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShakeMode {
    /// Fresh random direction every frame.
    #[default]
    Vibrate,
    /// One random direction per note, kept for the whole run.
    OneWay,
}

/// Every knob of a run. Fixed once rendering starts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderConfig {
    pub canvas: Canvas,
    /// X coordinate of the "now" line.
    pub guideline_x: i32,
    /// Width of the drawn guideline; 0 hides it.
    pub guideline_width: u32,
    pub note_height: u32,
    /// Extra vertical spacing per semitone away from the middle pitch.
    pub note_distance: i32,
    /// Peak rotation in degrees; positive tilts counter-clockwise.
    pub rotation_angle: f64,
    pub rotation_mode: RotationMode,
    pub shake_mode: ShakeMode,
    /// Hard clamp (pixels) for the Gaussian jitter.
    pub shake_amplitude: f64,
    pub shake_variance: f64,
    /// Activation offset as a percentage of the note height.
    pub shake_activation: f64,
    /// Seconds for an activated note to settle.
    pub return_to_center: f64,
    pub settle_curve: SettleCurve,
    pub pixels_per_second: f64,
    pub fps: u32,
    pub active_color: Rgb8,
    pub inactive_color: Rgb8,
    pub background_color: Rgb8,
    pub guideline_color: Rgb8,
    /// RNG seed for reproducible animation; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1920,
                height: 1080,
            },
            guideline_x: 960,
            guideline_width: 1,
            note_height: 10,
            note_distance: 0,
            rotation_angle: 0.0,
            rotation_mode: RotationMode::Dynamic,
            shake_mode: ShakeMode::Vibrate,
            shake_amplitude: 10.0,
            shake_variance: 0.0005,
            shake_activation: 0.0,
            return_to_center: 0.5,
            settle_curve: SettleCurve::Cubic,
            pixels_per_second: 1500.0,
            fps: 30,
            active_color: Rgb8::WHITE,
            inactive_color: Rgb8::new(100, 100, 100),
            background_color: Rgb8::BLACK,
            guideline_color: Rgb8::WHITE,
            seed: None,
        }
    }
}

impl RenderConfig {
    /// Replace every invalid field with its default, warning once per field.
    ///
    /// Returns the names of the fields that were reset.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let d = Self::default();
        let mut reset = Vec::new();

        fn check<T: std::fmt::Debug>(
            reset: &mut Vec<&'static str>,
            name: &'static str,
            value: &mut T,
            default: T,
            ok: bool,
        ) {
            if !ok {
                tracing::warn!(
                    field = name,
                    value = ?value,
                    default = ?default,
                    "invalid configuration value, using default"
                );
                *value = default;
                reset.push(name);
            }
        }

        let ok = self.canvas.width > 0 && self.canvas.width <= u32::from(u16::MAX);
        check(&mut reset, "canvas.width", &mut self.canvas.width, d.canvas.width, ok);
        let ok = self.canvas.height > 0 && self.canvas.height <= u32::from(u16::MAX);
        check(&mut reset, "canvas.height", &mut self.canvas.height, d.canvas.height, ok);
        let ok = self.fps > 0;
        check(&mut reset, "fps", &mut self.fps, d.fps, ok);
        let ok = self.pixels_per_second.is_finite() && self.pixels_per_second > 0.0;
        check(
            &mut reset,
            "pixels_per_second",
            &mut self.pixels_per_second,
            d.pixels_per_second,
            ok,
        );
        let ok = self.rotation_angle.is_finite();
        check(&mut reset, "rotation_angle", &mut self.rotation_angle, d.rotation_angle, ok);
        let ok = self.shake_amplitude.is_finite() && self.shake_amplitude >= 0.0;
        check(&mut reset, "shake_amplitude", &mut self.shake_amplitude, d.shake_amplitude, ok);
        let ok = self.shake_variance.is_finite() && self.shake_variance >= 0.0;
        check(&mut reset, "shake_variance", &mut self.shake_variance, d.shake_variance, ok);
        let ok = self.shake_activation.is_finite();
        check(
            &mut reset,
            "shake_activation",
            &mut self.shake_activation,
            d.shake_activation,
            ok,
        );
        let ok = self.return_to_center.is_finite() && self.return_to_center >= 0.0;
        check(
            &mut reset,
            "return_to_center",
            &mut self.return_to_center,
            d.return_to_center,
            ok,
        );
        reset
    }

    /// Pixels the activation offset is scaled by (`note_height * shake_activation%`).
    pub fn shake_activation_pixels(&self) -> f64 {
        f64::from(self.note_height) * self.shake_activation / 100.0
    }

    /// Emit the effective parameters, one line each.
    pub fn log_summary(&self) {
        tracing::info!(
            width = self.canvas.width,
            height = self.canvas.height,
            "canvas size"
        );
        tracing::info!(
            x = self.guideline_x,
            width = self.guideline_width,
            visible = self.guideline_width > 0,
            "guideline"
        );
        tracing::info!(
            height = self.note_height,
            distance = self.note_distance,
            "note geometry"
        );
        tracing::info!(
            angle = self.rotation_angle,
            mode = ?self.rotation_mode,
            "rotation"
        );
        tracing::info!(
            mode = ?self.shake_mode,
            amplitude = self.shake_amplitude,
            variance = self.shake_variance,
            activation = self.shake_activation,
            return_to_center = self.return_to_center,
            curve = ?self.settle_curve,
            "shake"
        );
        tracing::info!(
            pixels_per_second = self.pixels_per_second,
            fps = self.fps,
            "motion"
        );
        tracing::info!(
            active = %self.active_color,
            inactive = %self.inactive_color,
            background = %self.background_color,
            guideline = %self.guideline_color,
            "colors"
        );
    }
}

/// Partial configuration from a JSON file or command-line flags.
///
/// Integers are held as `i64` and colors as raw strings so an out-of-range or unparsable value
/// falls back to its default in [`ConfigOverrides::resolve`] instead of aborting the run. A JSON
/// value of the wrong type is dropped with a warning while the rest of the file still applies.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(deserialize_with = "lenient")]
    pub width: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub height: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub guideline_x: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub guideline_width: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub note_height: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub note_distance: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub rotation_angle: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub rotation_mode: Option<RotationMode>,
    #[serde(deserialize_with = "lenient")]
    pub shake_mode: Option<ShakeMode>,
    #[serde(deserialize_with = "lenient")]
    pub shake_amplitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub shake_variance: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub shake_activation: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub return_to_center: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub settle_curve: Option<SettleCurve>,
    #[serde(deserialize_with = "lenient")]
    pub pixels_per_second: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub fps: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub active_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub inactive_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub background_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub guideline_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub seed: Option<u64>,
}

/// Deserialize a field, turning a value of the wrong shape into `None` with a warning.
fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = <serde_json::Value as serde::Deserialize>::deserialize(de)?;
    if raw.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(raw.clone()) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            tracing::warn!(value = %raw, "invalid configuration value ({e}), using default");
            Ok(None)
        }
    }
}

/// Store `raw` into `slot` when it fits the target type, otherwise keep the default.
fn narrow<T>(name: &'static str, raw: Option<i64>, slot: &mut T)
where
    T: TryFrom<i64> + std::fmt::Display,
{
    let Some(v) = raw else {
        return;
    };
    match T::try_from(v) {
        Ok(n) => *slot = n,
        Err(_) => tracing::warn!(
            field = name,
            value = v,
            default = %slot,
            "configuration value out of range, using default"
        ),
    }
}

impl ConfigOverrides {
    pub fn from_json_file(path: &Path) -> MidirollResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MidirollError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> MidirollResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| MidirollError::validation(format!("invalid config JSON: {e}")))
    }

    /// Field-wise merge; values set in `over` win.
    pub fn merge(self, over: Self) -> Self {
        Self {
            width: over.width.or(self.width),
            height: over.height.or(self.height),
            guideline_x: over.guideline_x.or(self.guideline_x),
            guideline_width: over.guideline_width.or(self.guideline_width),
            note_height: over.note_height.or(self.note_height),
            note_distance: over.note_distance.or(self.note_distance),
            rotation_angle: over.rotation_angle.or(self.rotation_angle),
            rotation_mode: over.rotation_mode.or(self.rotation_mode),
            shake_mode: over.shake_mode.or(self.shake_mode),
            shake_amplitude: over.shake_amplitude.or(self.shake_amplitude),
            shake_variance: over.shake_variance.or(self.shake_variance),
            shake_activation: over.shake_activation.or(self.shake_activation),
            return_to_center: over.return_to_center.or(self.return_to_center),
            settle_curve: over.settle_curve.or(self.settle_curve),
            pixels_per_second: over.pixels_per_second.or(self.pixels_per_second),
            fps: over.fps.or(self.fps),
            active_color: over.active_color.or(self.active_color),
            inactive_color: over.inactive_color.or(self.inactive_color),
            background_color: over.background_color.or(self.background_color),
            guideline_color: over.guideline_color.or(self.guideline_color),
            seed: over.seed.or(self.seed),
        }
    }

    /// Apply on top of the defaults and sanitize the result.
    pub fn resolve(self) -> RenderConfig {
        let mut cfg = RenderConfig::default();

        narrow("canvas.width", self.width, &mut cfg.canvas.width);
        narrow("canvas.height", self.height, &mut cfg.canvas.height);
        narrow("guideline_x", self.guideline_x, &mut cfg.guideline_x);
        narrow("guideline_width", self.guideline_width, &mut cfg.guideline_width);
        narrow("note_height", self.note_height, &mut cfg.note_height);
        narrow("note_distance", self.note_distance, &mut cfg.note_distance);
        narrow("fps", self.fps, &mut cfg.fps);
        if let Some(v) = self.rotation_angle {
            cfg.rotation_angle = v;
        }
        if let Some(v) = self.rotation_mode {
            cfg.rotation_mode = v;
        }
        if let Some(v) = self.shake_mode {
            cfg.shake_mode = v;
        }
        if let Some(v) = self.shake_amplitude {
            cfg.shake_amplitude = v;
        }
        if let Some(v) = self.shake_variance {
            cfg.shake_variance = v;
        }
        if let Some(v) = self.shake_activation {
            cfg.shake_activation = v;
        }
        if let Some(v) = self.return_to_center {
            cfg.return_to_center = v;
        }
        if let Some(v) = self.settle_curve {
            cfg.settle_curve = v;
        }
        if let Some(v) = self.pixels_per_second {
            cfg.pixels_per_second = v;
        }
        cfg.seed = self.seed;

        for (name, raw, slot) in [
            ("active_color", self.active_color, &mut cfg.active_color),
            ("inactive_color", self.inactive_color, &mut cfg.inactive_color),
            ("background_color", self.background_color, &mut cfg.background_color),
            ("guideline_color", self.guideline_color, &mut cfg.guideline_color),
        ] {
            let Some(raw) = raw else {
                continue;
            };
            match raw.parse::<Rgb8>() {
                Ok(c) => *slot = c,
                Err(e) => tracing::warn!(field = name, default = %slot, "{e}, using default"),
            }
        }

        cfg.sanitize();
        cfg
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/render.rs"]
mod tests;
