use super::*;

fn cfg() -> VideoCompileConfig {
    VideoCompileConfig::new("out/song_frames/%04d.png", "out/song.mp4", 30)
}

#[test]
fn args_follow_the_image_sequence_recipe() {
    let args: Vec<String> = ffmpeg_args(&cfg())
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        args,
        [
            "-y",
            "-hide_banner",
            "-framerate",
            "30",
            "-i",
            "out/song_frames/%04d.png",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "out/song.mp4",
        ]
    );
}

#[test]
fn missing_executable_is_reported_as_not_found() {
    let cfg = VideoCompileConfig {
        program: PathBuf::from("midiroll-definitely-not-an-ffmpeg"),
        ..cfg()
    };
    assert_eq!(compile_video(&cfg).unwrap(), CompileOutcome::NotFound);
}

#[cfg(unix)]
#[test]
fn nonzero_exit_is_reported_as_failed() {
    let cfg = VideoCompileConfig {
        program: PathBuf::from("false"),
        ..cfg()
    };
    match compile_video(&cfg).unwrap() {
        CompileOutcome::Failed { code, .. } => assert_eq!(code, Some(1)),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn stderr_tail_keeps_last_lines_and_splits_progress() {
    let mut text = String::new();
    for i in 0..30 {
        text.push_str(&format!("line {i}\n"));
    }
    text.push_str("frame=  1\rframe=  2\r\n");
    let tail = drain_stderr(text.as_bytes()).unwrap();

    assert_eq!(tail.len(), STDERR_TAIL_LINES);
    assert_eq!(tail.back().map(String::as_str), Some("frame=  2"));
    assert_eq!(tail.front().map(String::as_str), Some("line 12"));
}

#[test]
fn zero_fps_is_rejected() {
    let cfg = VideoCompileConfig { fps: 0, ..cfg() };
    assert!(compile_video(&cfg).is_err());
}
