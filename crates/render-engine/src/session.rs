//! The overlay session: one staged clip, one engine, one render at a
//! time.
//!
//! Ties the stager, lifecycle controller, and handle registry together
//! behind the surface the presentation layer talks to: load a clip,
//! edit text, render, download.

use std::path::PathBuf;

use promoclip_common::config::AppConfig;
use promoclip_common::error::{PromoclipError, PromoclipResult};
use promoclip_model::filter::compile_filter;
use promoclip_model::spec::OverlaySpec;
use tokio::sync::watch;

use crate::controller::{EngineController, EngineState};
use crate::engine::TranscodeEngine;
use crate::handle::{HandleRegistry, MediaHandle};
use crate::stager::{INPUT_NAME, OUTPUT_NAME};

/// Configuration for an overlay session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding the two overlay font files.
    pub fonts_dir: PathBuf,

    /// Scratch root for handle files.
    pub workspace_dir: PathBuf,
}

impl SessionConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            fonts_dir: config.fonts_dir.clone(),
            workspace_dir: config.workspace_dir.clone(),
        }
    }
}

/// The clip currently staged in the engine, with its preview handle.
#[derive(Debug)]
pub struct StagedClip {
    /// Original file name, for display only.
    pub file_name: String,

    /// Preview handle over the input bytes.
    pub preview: MediaHandle,
}

/// A rendered result, superseded on every successful render.
#[derive(Debug)]
pub struct OutputAsset {
    pub handle: MediaHandle,
}

/// One editing session: at most one staged clip and one output.
pub struct OverlaySession {
    config: SessionConfig,
    // Handle slots precede the registry so they drop before the
    // registry removes the scratch directory.
    input: Option<StagedClip>,
    output: Option<OutputAsset>,
    handles: HandleRegistry,
    controller: EngineController,
}

impl OverlaySession {
    pub fn new(config: SessionConfig, engine: Box<dyn TranscodeEngine>) -> PromoclipResult<Self> {
        let scratch = config
            .workspace_dir
            .join(format!("handles-{}", std::process::id()));
        Ok(Self {
            config,
            input: None,
            output: None,
            handles: HandleRegistry::new(scratch)?,
            controller: EngineController::new(engine),
        })
    }

    /// Warm the engine up ahead of the first clip load.
    pub async fn warm_up(&mut self) -> PromoclipResult<()> {
        self.controller.ensure_loaded(&self.config.fonts_dir)
    }

    /// Stage a new clip: supersedes any previous staged asset and any
    /// previous output, loads the engine on first use, and exposes a
    /// preview handle over the input bytes.
    pub async fn load_clip(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PromoclipResult<&StagedClip> {
        if self.controller.is_rendering() {
            return Err(PromoclipError::stage("a render is in flight"));
        }
        validate_container(file_name)?;

        // Superseded resources are released before the new ones exist;
        // until staging completes the session is not ready.
        self.output = None;
        self.input = None;

        self.controller.ensure_loaded(&self.config.fonts_dir)?;
        self.controller.stage_input(&bytes)?;

        let preview = self.handles.register(&bytes, "preview", "mp4")?;
        tracing::info!(
            file_name,
            bytes = bytes.len(),
            staged_as = INPUT_NAME,
            "Clip staged"
        );

        Ok(self.input.insert(StagedClip {
            file_name: file_name.to_string(),
            preview,
        }))
    }

    /// Render the current spec onto the staged clip.
    ///
    /// Rejected synchronously (without contacting the engine) when no
    /// clip is staged, the engine is not loaded, or a render is in
    /// flight. On engine failure there is no retry: the cause is
    /// logged, a single generic error is surfaced, and readiness is
    /// restored.
    pub async fn render(&mut self, spec: &OverlaySpec) -> PromoclipResult<&OutputAsset> {
        if self.input.is_none() {
            return Err(PromoclipError::render("no clip is staged"));
        }
        self.controller.begin_render()?;

        let filter = compile_filter(spec);
        let argv = render_argv(&filter);
        tracing::info!(filter_len = filter.len(), "Render started");

        let result = self
            .controller
            .run_transcode(&argv)
            .and_then(|bytes| self.handles.register(&bytes, "output", "mp4"));

        match result {
            Ok(handle) => {
                tracing::info!(bytes = handle.len(), "Render complete");
                self.controller.finish_render(true);
                // Previous output handle is released by replacement.
                Ok(&*self.output.insert(OutputAsset { handle }))
            }
            Err(e) => {
                self.controller.finish_render(false);
                tracing::warn!(error = %e, "Render failed");
                Err(PromoclipError::render(
                    "Processing failed. Try a shorter clip or different overlay text.",
                ))
            }
        }
    }

    /// Whether a render may be attempted: engine loaded, clip staged,
    /// no render in flight.
    pub fn is_ready(&self) -> bool {
        self.controller.is_ready() && self.input.is_some()
    }

    pub fn engine_state(&self) -> EngineState {
        self.controller.state()
    }

    /// Render progress in percent (0–100).
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.controller.progress()
    }

    pub fn staged_clip(&self) -> Option<&StagedClip> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&OutputAsset> {
        self.output.as_ref()
    }
}

/// The exact transcode argv for one render: pass-through audio, H.264
/// video at the medium preset, metadata front-loaded for progressive
/// playback, yuv420p for broad player compatibility.
fn render_argv(filter: &str) -> Vec<String> {
    [
        "-i",
        INPUT_NAME,
        "-vf",
        filter,
        "-c:a",
        "copy",
        "-c:v",
        "libx264",
        "-preset",
        "medium",
        "-movflags",
        "faststart",
        "-pix_fmt",
        "yuv420p",
        OUTPUT_NAME,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// The file picker accepts MP4 and MOV containers.
fn validate_container(file_name: &str) -> PromoclipResult<()> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") | Some("mov") => Ok(()),
        _ => Err(PromoclipError::unsupported(format!(
            "unsupported container for {file_name:?}; expected .mp4 or .mov"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_validation() {
        assert!(validate_container("clip.mp4").is_ok());
        assert!(validate_container("CLIP.MOV").is_ok());
        assert!(validate_container("clip.avi").is_err());
        assert!(validate_container("clip").is_err());
    }

    #[test]
    fn test_render_argv_shape() {
        let argv = render_argv("drawtext=x");
        assert_eq!(argv.first().map(String::as_str), Some("-i"));
        assert_eq!(argv.get(1).map(String::as_str), Some("input.mp4"));
        assert_eq!(argv.get(3).map(String::as_str), Some("drawtext=x"));
        assert_eq!(argv.last().map(String::as_str), Some("output.mp4"));
        // Fixed encoder parameters, bit-exact.
        let joined = argv.join(" ");
        assert!(joined.contains("-c:a copy"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-preset medium"));
        assert!(joined.contains("-movflags faststart"));
        assert!(joined.contains("-pix_fmt yuv420p"));
    }
}
