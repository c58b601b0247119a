//! Drawtext filter-graph compilation.
//!
//! Turns an [`OverlaySpec`] into a single comma-joined `-vf` expression
//! of exactly three drawtext clauses. Pure and deterministic: the same
//! spec always compiles to the same string, and nothing here touches
//! the engine.

use crate::spec::OverlaySpec;
use crate::style::LAYER_STYLES;

/// Escape a text field for embedding inside `text='...'`.
///
/// Backslash escaping must run first so that the escape sequences
/// inserted by the later replacements are not themselves re-escaped.
pub fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}

/// Compile the overlay spec into one filter-graph expression.
///
/// Layer order is fixed (primary, promo, description); later clauses
/// composite on top of earlier ones. Empty fields still produce a
/// clause — a zero-width text box is intentional passthrough, not an
/// error.
pub fn compile_filter(spec: &OverlaySpec) -> String {
    let clauses: Vec<String> = spec
        .fields()
        .iter()
        .zip(LAYER_STYLES.iter())
        .map(|(text, style)| {
            format!(
                "drawtext=fontfile={font}:text='{text}':fontcolor=0x{color}:fontsize={size}:x=(w-text_w)/2:y=h*{y}:box=1:boxcolor=0x{box_color}:boxborderw={border}",
                font = style.font.file_name(),
                text = escape_drawtext(text),
                color = style.color,
                size = style.size,
                y = style.y_frac,
                box_color = style.box_color,
                border = style.box_border,
            )
        })
        .collect();

    clauses.join(",")
}
