use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{MidirollError, MidirollResult};

/// `base`, or the first of `base_1`, `base_2`, ... that does not exist yet.
pub fn unique_path(base: &Path) -> PathBuf {
    if !base.exists() {
        return base.to_path_buf();
    }
    (1u64..)
        .map(|n| suffixed(base, n))
        .find(|p| !p.exists())
        .unwrap_or_else(|| base.to_path_buf())
}

/// `dir/name.mp4` -> `dir/name_3.mp4`; the suffix goes before the extension.
fn suffixed(base: &Path, n: u64) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{n}"),
    };
    base.with_file_name(name)
}

/// Create a fresh directory at `base` or its first free numbered sibling.
pub fn create_unique_dir(base: &Path) -> MidirollResult<PathBuf> {
    if let Some(parent) = base.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }

    let candidates = std::iter::once(base.to_path_buf()).chain((1u64..).map(|n| suffixed(base, n)));
    for dir in candidates {
        match std::fs::create_dir(&dir) {
            Ok(()) => {
                tracing::debug!(dir = %dir.display(), "created frame directory");
                return Ok(dir);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to create directory '{}'", dir.display()))
                    .into());
            }
        }
    }
    Err(MidirollError::validation("no free directory name available"))
}

/// Frame directory for `midi_path` inside `out_dir`: `<stem>_frames`.
pub fn frames_dir_for(out_dir: &Path, midi_path: &Path) -> PathBuf {
    out_dir.join(format!("{}_frames", file_stem(midi_path)))
}

/// Video path for `midi_path` inside `out_dir`, disambiguated: `<stem>.mp4`, `<stem>_1.mp4`, ...
pub fn video_path_for(out_dir: &Path, midi_path: &Path) -> PathBuf {
    unique_path(&out_dir.join(format!("{}.mp4", file_stem(midi_path))))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string())
}

/// Delete the temporary frames. Failure only warns; returns whether the directory is gone.
pub fn remove_frames_dir(dir: &Path) -> bool {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::info!(dir = %dir.display(), "removed frame directory");
            true
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to remove frame directory");
            false
        }
    }
}

/// Hand `path` to the platform's default application without waiting for it.
///
/// The opener is reaped on a detached thread, so repeated calls leave no zombie processes.
pub fn open_with_default_app(path: &Path) -> MidirollResult<()> {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else {
        std::process::Command::new("xdg-open")
    };
    cmd.arg(path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());
    spawn_reaped(cmd).with_context(|| format!("failed to open '{}'", path.display()))?;
    Ok(())
}

/// Spawn `cmd` and wait for it on a background thread.
fn spawn_reaped(
    mut cmd: std::process::Command,
) -> std::io::Result<std::thread::JoinHandle<Option<std::process::ExitStatus>>> {
    let mut child = cmd.spawn()?;
    std::thread::Builder::new()
        .name("midiroll-open".to_string())
        .spawn(move || child.wait().ok())
}

#[cfg(test)]
#[path = "../../tests/unit/output/paths.rs"]
mod tests;
