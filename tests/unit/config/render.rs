use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = RenderConfig::default();
    assert_eq!(
        cfg.canvas,
        Canvas {
            width: 1920,
            height: 1080
        }
    );
    assert_eq!(cfg.guideline_x, 960);
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.pixels_per_second, 1500.0);
    assert_eq!(cfg.inactive_color, Rgb8::new(100, 100, 100));
    assert_eq!(cfg.rotation_mode, RotationMode::Dynamic);
    assert_eq!(cfg.shake_mode, ShakeMode::Vibrate);
    assert!(cfg.seed.is_none());
}

#[test]
fn sanitize_resets_invalid_fields_only() {
    let mut cfg = RenderConfig {
        fps: 0,
        pixels_per_second: -3.0,
        return_to_center: f64::NAN,
        note_height: 24,
        ..RenderConfig::default()
    };
    let reset = cfg.sanitize();
    assert_eq!(reset, vec!["fps", "pixels_per_second", "return_to_center"]);
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.pixels_per_second, 1500.0);
    assert_eq!(cfg.return_to_center, 0.5);
    assert_eq!(cfg.note_height, 24);
}

#[test]
fn sanitize_rejects_canvas_beyond_rasterizer_limits() {
    let mut cfg = RenderConfig::default();
    cfg.canvas.width = 70_000;
    cfg.canvas.height = 0;
    let reset = cfg.sanitize();
    assert_eq!(reset, vec!["canvas.width", "canvas.height"]);
    assert_eq!(cfg.canvas.width, 1920);
    assert_eq!(cfg.canvas.height, 1080);
}

#[test]
fn overrides_resolve_on_top_of_defaults() {
    let cfg = ConfigOverrides {
        width: Some(640),
        height: Some(360),
        shake_mode: Some(ShakeMode::OneWay),
        active_color: Some("#ff0000".to_string()),
        seed: Some(7),
        ..ConfigOverrides::default()
    }
    .resolve();
    assert_eq!(cfg.canvas.width, 640);
    assert_eq!(cfg.canvas.height, 360);
    assert_eq!(cfg.shake_mode, ShakeMode::OneWay);
    assert_eq!(cfg.active_color, Rgb8::new(255, 0, 0));
    assert_eq!(cfg.seed, Some(7));
    assert_eq!(cfg.guideline_x, 960);
}

#[test]
fn bad_color_falls_back_to_default() {
    let cfg = ConfigOverrides {
        background_color: Some("not-a-color".to_string()),
        guideline_color: Some("10,20,30".to_string()),
        ..ConfigOverrides::default()
    }
    .resolve();
    assert_eq!(cfg.background_color, Rgb8::BLACK);
    assert_eq!(cfg.guideline_color, Rgb8::new(10, 20, 30));
}

#[test]
fn invalid_numeric_override_falls_back() {
    let cfg = ConfigOverrides {
        fps: Some(0),
        shake_variance: Some(-1.0),
        ..ConfigOverrides::default()
    }
    .resolve();
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.shake_variance, 0.0005);
}

#[test]
fn out_of_range_json_number_only_resets_its_field() {
    let cfg = ConfigOverrides::from_json_str(r#"{ "fps": -5, "width": 640 }"#)
        .unwrap()
        .resolve();
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.canvas.width, 640);
}

#[test]
fn mistyped_json_values_fall_back_per_field() {
    let cfg = ConfigOverrides::from_json_str(
        r#"{ "fps": "fast", "rotation_mode": "sideways", "guideline_x": 1e12, "note_height": 14 }"#,
    )
    .unwrap()
    .resolve();
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.rotation_mode, RotationMode::Dynamic);
    assert_eq!(cfg.guideline_x, 960);
    assert_eq!(cfg.note_height, 14);
}

#[test]
fn negative_override_for_unsigned_field_keeps_default() {
    let cfg = ConfigOverrides {
        guideline_width: Some(-2),
        guideline_x: Some(-40),
        ..ConfigOverrides::default()
    }
    .resolve();
    assert_eq!(cfg.guideline_width, 1);
    assert_eq!(cfg.guideline_x, -40);
}

#[test]
fn merge_prefers_later_values() {
    let file = ConfigOverrides::from_json_str(
        r#"{ "fps": 60, "note_height": 12, "rotation_mode": "fixed" }"#,
    )
    .unwrap();
    let cli = ConfigOverrides {
        fps: Some(24),
        ..ConfigOverrides::default()
    };
    let cfg = file.merge(cli).resolve();
    assert_eq!(cfg.fps, 24);
    assert_eq!(cfg.note_height, 12);
    assert_eq!(cfg.rotation_mode, RotationMode::Fixed);
}

#[test]
fn json_rejects_unknown_fields() {
    assert!(ConfigOverrides::from_json_str(r#"{ "fsp": 60 }"#).is_err());
}

#[test]
fn shake_activation_pixels_scale_with_note_height() {
    let cfg = RenderConfig {
        note_height: 20,
        shake_activation: 50.0,
        ..RenderConfig::default()
    };
    assert_eq!(cfg.shake_activation_pixels(), 10.0);
}
