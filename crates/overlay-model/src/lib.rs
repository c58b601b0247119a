//! Promoclip Data Model
//!
//! The overlay spec (the three user-editable text fields), the static
//! per-layer styling table, and the pure filter compiler that turns a
//! spec into a single ffmpeg drawtext filter-graph expression.

pub mod filter;
pub mod spec;
pub mod style;

pub use filter::{compile_filter, escape_drawtext};
pub use spec::OverlaySpec;
pub use style::{FontFace, LayerStyle, LAYER_STYLES};
