//! Assembles a numbered PNG sequence into an H.264 MP4 with the system `ffmpeg`.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::foundation::error::{MidirollError, MidirollResult};

const STDERR_TAIL_LINES: usize = 20;

#[derive(Clone, Debug)]
pub struct VideoCompileConfig {
    /// Executable to run; `ffmpeg` resolved through `PATH` by default.
    pub program: PathBuf,
    pub fps: u32,
    /// printf-style frame pattern, e.g. `frames/%04d.png`.
    pub input_pattern: PathBuf,
    pub out_path: PathBuf,
}

impl VideoCompileConfig {
    pub fn new(input_pattern: impl Into<PathBuf>, out_path: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            fps,
            input_pattern: input_pattern.into(),
            out_path: out_path.into(),
        }
    }
}

/// Result of one compiler run. Frames are left untouched in every case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileOutcome {
    Success,
    /// The compiler ran and exited non-zero (`code` is `None` when killed by a signal).
    Failed {
        code: Option<i32>,
        stderr_tail: String,
    },
    /// The executable could not be found.
    NotFound,
}

/// Arguments after the program name. Odd canvas sizes are padded to even for yuv420p.
pub fn ffmpeg_args(cfg: &VideoCompileConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-hide_banner", "-framerate"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(cfg.fps.to_string().into());
    args.push("-i".into());
    args.push(cfg.input_pattern.clone().into_os_string());
    for a in [
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-vf",
        "pad=ceil(iw/2)*2:ceil(ih/2)*2",
    ] {
        args.push(a.into());
    }
    args.push(cfg.out_path.clone().into_os_string());
    args
}

#[tracing::instrument(skip_all, fields(out = %cfg.out_path.display(), fps = cfg.fps))]
pub fn compile_video(cfg: &VideoCompileConfig) -> MidirollResult<CompileOutcome> {
    if cfg.fps == 0 {
        return Err(MidirollError::validation("compile fps must be non-zero"));
    }

    let mut cmd = Command::new(&cfg.program);
    cmd.args(ffmpeg_args(cfg))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    tracing::debug!(command = ?cmd, "running video compiler");

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(program = %cfg.program.display(), "video compiler executable not found");
            return Ok(CompileOutcome::NotFound);
        }
        Err(e) => {
            return Err(MidirollError::pipeline(format!(
                "failed to spawn '{}': {e}",
                cfg.program.display()
            )));
        }
    };

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| MidirollError::pipeline("failed to open ffmpeg stderr (unexpected)"))?;
    let stderr_drain = std::thread::spawn(move || drain_stderr(stderr));

    let status = child
        .wait()
        .map_err(|e| MidirollError::pipeline(format!("failed to wait for ffmpeg: {e}")))?;
    let tail = stderr_drain
        .join()
        .map_err(|_| MidirollError::pipeline("ffmpeg stderr drain thread panicked"))?
        .map_err(|e| MidirollError::pipeline(format!("ffmpeg stderr read failed: {e}")))?;

    if status.success() {
        tracing::info!("video compiled");
        Ok(CompileOutcome::Success)
    } else {
        tracing::warn!(status = %status, "video compiler failed");
        Ok(CompileOutcome::Failed {
            code: status.code(),
            stderr_tail: tail.into_iter().collect::<Vec<_>>().join("\n"),
        })
    }
}

/// Log notable lines as they arrive and keep the last few for the failure report.
fn drain_stderr(stderr: impl Read) -> std::io::Result<VecDeque<String>> {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    // Progress lines are separated by '\r', everything else by '\n'.
    for chunk in BufReader::new(stderr).split(b'\n') {
        let chunk = chunk?;
        for raw in chunk.split(|&b| b == b'\r') {
            let line = String::from_utf8_lossy(raw).trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.contains("Error") || line.contains("error") {
                tracing::warn!(target: "midiroll::ffmpeg", "{line}");
            } else if line.starts_with("frame=") {
                tracing::debug!(target: "midiroll::ffmpeg", "{line}");
            }
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
    }
    Ok(tail)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/ffmpeg.rs"]
mod tests;
