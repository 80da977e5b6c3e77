use super::*;
use std::path::Path;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("midiroll_png_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn padding_tracks_total_frame_digits() {
    assert_eq!(frame_file_name(FrameIndex(7), 1234), "0007.png");
    assert_eq!(frame_file_name(FrameIndex(7), 9), "07.png");
    assert_eq!(frame_file_name(FrameIndex(0), 0), "00.png");
    assert_eq!(frame_file_name(FrameIndex(99_999), 100_000), "099999.png");
    assert_eq!(frame_pad_width(100), 3);
}

#[test]
fn lexical_order_matches_frame_order() {
    let total = 1500;
    let mut names: Vec<String> = (0..total)
        .map(|i| frame_file_name(FrameIndex(i), total))
        .collect();
    let numeric = names.clone();
    names.sort();
    assert_eq!(names, numeric);
}

#[test]
fn input_pattern_uses_pad_width() {
    let enc = PngSequenceEncoder::new("frames", 1234);
    assert_eq!(enc.input_pattern(), Path::new("frames").join("%04d.png"));
    assert_eq!(enc.path_for(FrameIndex(7)), Path::new("frames").join("0007.png"));
}

#[test]
fn encode_writes_a_readable_png() {
    let dir = temp_dir("write");
    let enc = PngSequenceEncoder::new(&dir, 20);

    let mut img = image::RgbaImage::new(4, 3);
    img.put_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
    enc.encode(GeneratedFrame::new(FrameIndex(3), img)).unwrap();

    let back = image::open(dir.join("03.png")).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (4, 3));
    assert_eq!(back.get_pixel(2, 1).0, [10, 20, 30, 255]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn encode_into_missing_dir_is_an_encode_error() {
    let dir = std::env::temp_dir().join(format!("midiroll_png_missing_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let enc = PngSequenceEncoder::new(dir.join("nope"), 10);
    let err = enc
        .encode(GeneratedFrame::new(FrameIndex(0), image::RgbaImage::new(1, 1)))
        .unwrap_err();
    assert!(matches!(err, MidirollError::Encode(_)));
}
