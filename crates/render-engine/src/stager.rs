//! Staging of fonts and the input clip into the engine.

use std::path::Path;

use promoclip_common::error::{PromoclipError, PromoclipResult};
use promoclip_model::style::FontFace;

use crate::engine::TranscodeEngine;

/// Logical name of the staged input clip. Staging a new clip
/// overwrites this slot.
pub const INPUT_NAME: &str = "input.mp4";

/// Logical name the engine writes the rendered result under.
pub const OUTPUT_NAME: &str = "output.mp4";

/// Lazily stages the two overlay fonts into the engine, exactly once
/// per session.
#[derive(Debug, Default)]
pub struct FontStager {
    staged: bool,
}

impl FontStager {
    pub fn new() -> Self {
        Self { staged: false }
    }

    pub fn is_staged(&self) -> bool {
        self.staged
    }

    /// Read both font files from the fonts directory and write them
    /// into the engine. A no-op after the first success; any failure
    /// leaves the stager unstaged so the next call retries both fonts.
    pub fn ensure_fonts(
        &mut self,
        engine: &mut dyn TranscodeEngine,
        fonts_dir: &Path,
    ) -> PromoclipResult<()> {
        if self.staged {
            return Ok(());
        }

        for face in [FontFace::Bold, FontFace::Regular] {
            let path = fonts_dir.join(face.file_name());
            let bytes = std::fs::read(&path).map_err(|e| {
                PromoclipError::font_fetch(format!(
                    "Failed to read font {}: {e}",
                    path.display()
                ))
            })?;
            engine.write_file(face.file_name(), &bytes).map_err(|e| {
                PromoclipError::font_fetch(format!(
                    "Failed to stage font {}: {e}",
                    face.file_name()
                ))
            })?;
            tracing::debug!(font = face.file_name(), bytes = bytes.len(), "Font staged");
        }

        self.staged = true;
        Ok(())
    }
}

/// Write the input clip into the engine under [`INPUT_NAME`].
///
/// Must run to completion before the session may report ready; the
/// engine acknowledges the write by returning.
pub fn stage_input(engine: &mut dyn TranscodeEngine, bytes: &[u8]) -> PromoclipResult<()> {
    engine
        .write_file(INPUT_NAME, bytes)
        .map_err(|e| PromoclipError::stage(format!("Failed to stage input clip: {e}")))
}
