use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
    assert_eq!(
        r.iter().collect::<Vec<_>>(),
        vec![FrameIndex(2), FrameIndex(3), FrameIndex(4)]
    );
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
    assert!(
        FrameRange::new(FrameIndex(3), FrameIndex(3))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn color_parses_hex_with_and_without_hash() {
    assert_eq!("#FF8000".parse::<Rgb8>().unwrap(), Rgb8::new(255, 128, 0));
    assert_eq!("0a0b0c".parse::<Rgb8>().unwrap(), Rgb8::new(10, 11, 12));
}

#[test]
fn color_parses_rgb_triplets() {
    assert_eq!(
        " 100, 100 ,100 ".parse::<Rgb8>().unwrap(),
        Rgb8::new(100, 100, 100)
    );
}

#[test]
fn color_rejects_garbage() {
    for bad in ["", "#12345", "#GGGGGG", "1,2", "256,0,0", "-1,0,0", "red"] {
        assert!(bad.parse::<Rgb8>().is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn color_serde_uses_hex_strings() {
    let json = serde_json::to_string(&Rgb8::new(1, 2, 255)).unwrap();
    assert_eq!(json, "\"#0102ff\"");
    let back: Rgb8 = serde_json::from_str("\"1,2,255\"").unwrap();
    assert_eq!(back, Rgb8::new(1, 2, 255));
    assert_eq!(Rgb8::new(1, 2, 255).to_string(), "(1,2,255)");
}
