//! Promoclip Render Engine
//!
//! The overlay render pipeline: stages an uploaded clip and the two
//! overlay fonts into a black-box transcoding engine, drives the
//! engine through its lifecycle, and owns every byte-stream handle the
//! presentation layer sees.
//!
//! # Pipeline Architecture
//!
//! ```text
//! clip bytes ──► Stager ──► engine storage (input.mp4)
//! fonts ───────► Stager ──► engine storage (*.ttf, once)
//!                                │
//! OverlaySpec ──► Filter Compiler┤
//!                                ▼
//!                      exec(-i input.mp4 -vf …)
//!                                │ progress 0..=1
//!                                ▼
//!                        output.mp4 bytes ──► MediaHandle
//! ```

pub mod controller;
pub mod engine;
pub mod handle;
pub mod session;
pub mod stager;

pub use controller::{EngineController, EngineState};
pub use engine::{FfmpegEngine, ProgressFn, TranscodeEngine};
pub use handle::{HandleRegistry, MediaHandle};
pub use session::{OutputAsset, OverlaySession, SessionConfig, StagedClip};
pub use stager::{FontStager, INPUT_NAME, OUTPUT_NAME};
