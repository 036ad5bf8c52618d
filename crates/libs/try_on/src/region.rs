use crate::TryOnError;
use common_types::{Category, GarmentCategory};
use serde::Serialize;

/// Which part of the padded frame the synthesis model should dress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionHint {
    UpperBody,
    /// Pin inference to the lower half so trousers and skirts never land on the torso.
    LowerHalf,
    FullBody,
}

impl RegionHint {
    /// Category name the try-on model understands.
    #[must_use]
    pub const fn model_category(self) -> &'static str {
        match self {
            Self::UpperBody => "upper_body",
            Self::LowerHalf => "lower_body",
            Self::FullBody => "dresses",
        }
    }

    /// Vertical band of the frame the model may edit, as fractions from the top.
    #[must_use]
    pub const fn frame_band(self) -> (f32, f32) {
        match self {
            Self::UpperBody => (0.0, 0.6),
            Self::LowerHalf => (0.5, 1.0),
            Self::FullBody => (0.0, 1.0),
        }
    }
}

#[must_use]
pub const fn region_hint(category: GarmentCategory) -> RegionHint {
    match category {
        GarmentCategory::UpperBody => RegionHint::UpperBody,
        GarmentCategory::MiniSkirt
        | GarmentCategory::MidiSkirt
        | GarmentCategory::LongSkirt
        | GarmentCategory::MaxiSkirt
        | GarmentCategory::HotPants
        | GarmentCategory::CapriPants
        | GarmentCategory::AnklePants
        | GarmentCategory::FullPants => RegionHint::LowerHalf,
        GarmentCategory::Dress => RegionHint::FullBody,
    }
}

/// Map a catalog category onto the fixed table. Anything else is refused, never guessed.
pub fn resolve_category(category: &Category) -> Result<GarmentCategory, TryOnError> {
    category
        .known()
        .ok_or_else(|| TryOnError::UnsupportedCategory(category.to_string()))
}
