//! Fixed per-layer styling.
//!
//! Styling is configuration data, not logic: the compiler iterates
//! this table and never branches on which layer it is drawing.

/// Font face used by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Bold,
    Regular,
}

impl FontFace {
    /// Logical file name of the font inside the engine's working
    /// storage. The stager writes both fonts under these exact names.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Bold => "Montserrat-Bold.ttf",
            Self::Regular => "Montserrat-Regular.ttf",
        }
    }
}

/// Style of a single drawtext layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerStyle {
    pub font: FontFace,
    pub size: u32,
    /// RGBA as hex digits, without the `0x` prefix.
    pub color: &'static str,
    /// Vertical anchor as a fraction of the frame height, rendered as
    /// `y=h*<frac>`.
    pub y_frac: &'static str,
    /// Background box RGBA as hex digits.
    pub box_color: &'static str,
    pub box_border: u32,
}

/// Styles in fixed layer order: primary, promo, description.
///
/// Later layers are composited on top of earlier ones, so primary is
/// drawn first and description last.
pub const LAYER_STYLES: [LayerStyle; 3] = [
    // primary: white tagline at 8% from the top
    LayerStyle {
        font: FontFace::Bold,
        size: 64,
        color: "FFFFFFFF",
        y_frac: "0.08",
        box_color: "000000AA",
        box_border: 24,
    },
    // promo: gold headline at 38%, heavier box
    LayerStyle {
        font: FontFace::Bold,
        size: 80,
        color: "FFD700FF",
        y_frac: "0.38",
        box_color: "000000C0",
        box_border: 28,
    },
    // description: white support line at 72%
    LayerStyle {
        font: FontFace::Regular,
        size: 48,
        color: "FFFFFFFF",
        y_frac: "0.72",
        box_color: "000000AA",
        box_border: 22,
    },
];
