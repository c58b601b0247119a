//! The user-editable overlay text fields.

use serde::{Deserialize, Serialize};

/// The three text fields drawn onto the clip.
///
/// Fields are free-form and may contain characters that are meaningful
/// to the filter-graph syntax; escaping happens at compile time, not
/// here. The spec has no lifecycle of its own — it is re-read whenever
/// a render is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySpec {
    /// Short tagline drawn near the top of the frame.
    pub primary: String,

    /// Highlighted headline drawn across the middle.
    pub promo: String,

    /// Support line drawn in the lower third.
    pub description: String,
}

impl OverlaySpec {
    pub fn new(
        primary: impl Into<String>,
        promo: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            promo: promo.into(),
            description: description.into(),
        }
    }

    /// The fields in fixed layer order: primary, promo, description.
    ///
    /// Layer order determines z-order in the compiled expression, so
    /// this ordering must match [`crate::style::LAYER_STYLES`].
    pub fn fields(&self) -> [&str; 3] {
        [&self.primary, &self.promo, &self.description]
    }
}

impl Default for OverlaySpec {
    fn default() -> Self {
        Self {
            primary: "original as i write".to_string(),
            promo: "BLACK FRIDAY 28 NËNTORI".to_string(),
            description: "Personalizoni shishet me logo foto shkrime sipas dëshirës.".to_string(),
        }
    }
}
