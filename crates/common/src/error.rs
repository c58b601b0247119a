//! Error types shared across Promoclip crates.

use std::path::PathBuf;

/// Top-level error type for Promoclip operations.
#[derive(Debug, thiserror::Error)]
pub enum PromoclipError {
    /// Writing the input asset or a font into the engine failed.
    #[error("Staging error: {message}")]
    Stage { message: String },

    /// A font resource could not be read. Blocks all rendering until
    /// the fonts directory is corrected.
    #[error("Font fetch error: {message}")]
    FontFetch { message: String },

    /// The transcoding engine failed to initialize.
    #[error("Engine load error: {message}")]
    EngineLoad { message: String },

    /// A transcode invocation failed.
    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PromoclipError.
pub type PromoclipResult<T> = Result<T, PromoclipError>;

impl PromoclipError {
    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage {
            message: msg.into(),
        }
    }

    pub fn font_fetch(msg: impl Into<String>) -> Self {
        Self::FontFetch {
            message: msg.into(),
        }
    }

    pub fn engine_load(msg: impl Into<String>) -> Self {
        Self::EngineLoad {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error belongs to the loading phase (engine or
    /// resource setup) rather than the render phase.
    pub fn is_load_phase(&self) -> bool {
        matches!(
            self,
            Self::Stage { .. } | Self::FontFetch { .. } | Self::EngineLoad { .. }
        )
    }
}
