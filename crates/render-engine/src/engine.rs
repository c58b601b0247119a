//! The transcoding engine boundary.
//!
//! The pipeline treats the engine as a black-box command executor with
//! a file-staging API: bytes go in under logical names, a command runs
//! against those names, bytes come back out. [`FfmpegEngine`] is the
//! production implementation driving the system `ffmpeg` binary; tests
//! substitute their own implementations of [`TranscodeEngine`].

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use promoclip_common::error::{PromoclipError, PromoclipResult};

/// Fire-and-forget progress observer: ratio in `0.0..=1.0`.
///
/// Calls are best-effort and must never block the engine; the last
/// delivered value is authoritative.
pub type ProgressFn = dyn Fn(f64) + Send + Sync;

/// Black-box transcoding engine with a virtual-filesystem staging API.
///
/// The engine executes one operation at a time; the lifecycle
/// controller is the serialization point, so implementations do not
/// need internal locking.
pub trait TranscodeEngine: Send {
    /// One-time initialization. Idempotent for loaded engines.
    fn load(&mut self) -> PromoclipResult<()>;

    /// Write bytes into the engine's working storage under a logical
    /// name. Overwrites any previous content under the same name.
    fn write_file(&mut self, name: &str, bytes: &[u8]) -> PromoclipResult<()>;

    /// Run a transcode invocation. `argv` references inputs and
    /// outputs by their logical names.
    fn exec(&mut self, argv: &[String], progress: Option<&ProgressFn>) -> PromoclipResult<()>;

    /// Read bytes back out of the engine's working storage.
    fn read_file(&mut self, name: &str) -> PromoclipResult<Vec<u8>>;
}

/// Production engine driving the system `ffmpeg` binary.
///
/// The staging directory is the engine's working storage: logical
/// names map to files inside it, and `exec` runs with the staging
/// directory as the working directory so argv names resolve unchanged.
pub struct FfmpegEngine {
    staging_dir: PathBuf,
    loaded: bool,
}

impl FfmpegEngine {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            loaded: false,
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    fn require_loaded(&self) -> PromoclipResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(PromoclipError::engine_load("engine is not loaded"))
        }
    }

    /// Map a logical name to its path inside the staging directory.
    /// Only bare names are valid; the staging API is flat.
    fn resolve(&self, name: &str) -> PromoclipResult<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(PromoclipError::unsupported(format!(
                "invalid logical file name: {name:?}"
            )));
        }
        Ok(self.staging_dir.join(name))
    }

    fn run_ffmpeg(&self, argv: &[String], progress: Option<&ProgressFn>) -> PromoclipResult<()> {
        let duration_secs = input_name(argv)
            .and_then(|name| self.resolve(name).ok())
            .and_then(|path| probe_media_duration(&path));

        let mut cmd = Command::new("ffmpeg");
        cmd.args([
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-nostats",
            "-progress",
            "pipe:1",
        ])
        .args(argv)
        .current_dir(&self.staging_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        tracing::debug!(?argv, ?duration_secs, "Running ffmpeg");
        let mut child = cmd
            .spawn()
            .map_err(|e| PromoclipError::render(format!("Failed to start ffmpeg: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PromoclipError::render("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| PromoclipError::render("Failed to capture ffmpeg stderr"))?;

        // Drain stderr concurrently so ffmpeg never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut state = ProgressState::default();
        loop {
            line.clear();
            let bytes = reader.read_line(&mut line).map_err(|e| {
                PromoclipError::render(format!("Failed reading ffmpeg progress: {e}"))
            })?;
            if bytes == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some((key, value)) = trimmed.split_once('=') {
                state.update(key, value);
                if key == "progress" {
                    if let (Some(cb), Some(ratio)) = (progress, state.ratio(duration_secs)) {
                        cb(ratio);
                    }
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| PromoclipError::render(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(PromoclipError::render(format!(
                "ffmpeg exited with {}: {}",
                status,
                stderr_output.trim()
            )));
        }

        Ok(())
    }
}

impl TranscodeEngine for FfmpegEngine {
    fn load(&mut self) -> PromoclipResult<()> {
        if self.loaded {
            return Ok(());
        }
        if !command_exists("ffmpeg") {
            return Err(PromoclipError::engine_load(
                "ffmpeg was not found on PATH; install ffmpeg to render overlays",
            ));
        }
        std::fs::create_dir_all(&self.staging_dir).map_err(|e| {
            PromoclipError::engine_load(format!(
                "Failed to create staging directory {}: {e}",
                self.staging_dir.display()
            ))
        })?;
        self.loaded = true;
        tracing::info!(staging_dir = %self.staging_dir.display(), "Transcode engine loaded");
        Ok(())
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> PromoclipResult<()> {
        self.require_loaded()?;
        let path = self.resolve(name)?;
        std::fs::write(&path, bytes)?;
        tracing::debug!(name, bytes = bytes.len(), "Staged file into engine");
        Ok(())
    }

    fn exec(&mut self, argv: &[String], progress: Option<&ProgressFn>) -> PromoclipResult<()> {
        self.require_loaded()?;
        self.run_ffmpeg(argv, progress)
    }

    fn read_file(&mut self, name: &str) -> PromoclipResult<Vec<u8>> {
        self.require_loaded()?;
        let path = self.resolve(name)?;
        std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PromoclipError::FileNotFound { path }
            } else {
                e.into()
            }
        })
    }
}

/// The logical input name referenced by an argv, if any.
fn input_name(argv: &[String]) -> Option<&str> {
    argv.iter()
        .position(|arg| arg == "-i")
        .and_then(|idx| argv.get(idx + 1))
        .map(String::as_str)
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn probe_media_duration(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    let duration = raw.lines().next()?.trim().parse::<f64>().ok()?;
    if duration.is_finite() && duration > 0.0 {
        Some(duration)
    } else {
        None
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            "out_time_ms" => {
                if let Ok(ms) = value.parse::<f64>() {
                    self.out_time_secs = ms / 1_000_000.0;
                }
            }
            "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }

    /// Ratio for the observer, when one can be computed. Without a
    /// probed duration only completion is reported.
    fn ratio(&self, duration_secs: Option<f64>) -> Option<f64> {
        if self.complete {
            return Some(1.0);
        }
        duration_secs.map(|duration| {
            if duration <= 0.0 {
                0.0
            } else {
                (self.out_time_secs / duration).clamp(0.0, 1.0)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_path_traversal() {
        let engine = FfmpegEngine::new("/tmp/promoclip-test-staging");
        assert!(engine.resolve("input.mp4").is_ok());
        assert!(engine.resolve("../input.mp4").is_err());
        assert!(engine.resolve("a/b.mp4").is_err());
        assert!(engine.resolve("").is_err());
    }

    #[test]
    fn test_operations_require_load() {
        let mut engine = FfmpegEngine::new("/tmp/promoclip-test-staging");
        assert!(engine.write_file("input.mp4", b"x").is_err());
        assert!(engine.read_file("output.mp4").is_err());
    }

    #[test]
    fn test_input_name_extraction() {
        let argv: Vec<String> = ["-i", "input.mp4", "-vf", "null", "output.mp4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(input_name(&argv), Some("input.mp4"));
        assert_eq!(input_name(&argv[2..]), None);
    }

    #[test]
    fn test_progress_state_tracks_out_time() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "2500000");
        assert_eq!(state.ratio(Some(10.0)), Some(0.25));
        // Unknown duration: no ratio until completion.
        assert_eq!(state.ratio(None), None);
        state.update("progress", "end");
        assert_eq!(state.ratio(None), Some(1.0));
    }

    #[test]
    fn test_progress_ratio_is_clamped() {
        let mut state = ProgressState::default();
        state.update("out_time_ms", "99000000");
        assert_eq!(state.ratio(Some(10.0)), Some(1.0));
    }
}
