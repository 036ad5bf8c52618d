use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// The fixed set of garment categories the try-on pipeline knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum GarmentCategory {
    #[serde(alias = "Upper-body", alias = "upper_body")]
    UpperBody,
    MiniSkirt,
    MidiSkirt,
    LongSkirt,
    MaxiSkirt,
    HotPants,
    CapriPants,
    AnklePants,
    FullPants,
    #[serde(alias = "Dress", alias = "dresses")]
    Dress,
}

/// Which part of an outfit a category fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryGroup {
    UpperBody,
    LowerBody,
    /// Dresses: a complete outfit on their own.
    FullBody,
}

impl GarmentCategory {
    pub const ALL: [Self; 10] = [
        Self::UpperBody,
        Self::MiniSkirt,
        Self::MidiSkirt,
        Self::LongSkirt,
        Self::MaxiSkirt,
        Self::HotPants,
        Self::CapriPants,
        Self::AnklePants,
        Self::FullPants,
        Self::Dress,
    ];

    #[must_use]
    pub const fn group(self) -> CategoryGroup {
        match self {
            Self::UpperBody => CategoryGroup::UpperBody,
            Self::MiniSkirt
            | Self::MidiSkirt
            | Self::LongSkirt
            | Self::MaxiSkirt
            | Self::HotPants
            | Self::CapriPants
            | Self::AnklePants
            | Self::FullPants => CategoryGroup::LowerBody,
            Self::Dress => CategoryGroup::FullBody,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpperBody => "upper-body",
            Self::MiniSkirt => "mini-skirt",
            Self::MidiSkirt => "midi-skirt",
            Self::LongSkirt => "long-skirt",
            Self::MaxiSkirt => "maxi-skirt",
            Self::HotPants => "hot-pants",
            Self::CapriPants => "capri-pants",
            Self::AnklePants => "ankle-pants",
            Self::FullPants => "full-pants",
            Self::Dress => "dress",
        }
    }
}

impl fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category as stored in the catalog. Records outside the fixed set are kept as
/// `Unknown` so callers can reject them explicitly instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Known(GarmentCategory),
    Unknown(String),
}

impl Category {
    #[must_use]
    pub const fn known(&self) -> Option<GarmentCategory> {
        match self {
            Self::Known(category) => Some(*category),
            Self::Unknown(_) => None,
        }
    }

    #[must_use]
    pub const fn group(&self) -> Option<CategoryGroup> {
        match self.known() {
            Some(category) => Some(category.group()),
            None => None,
        }
    }
}

impl From<GarmentCategory> for Category {
    fn from(category: GarmentCategory) -> Self {
        Self::Known(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(category) => category.fmt(f),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "男性", alias = "Male", alias = "men")]
    Male,
    #[serde(alias = "女性", alias = "Female", alias = "women")]
    Female,
    #[serde(alias = "中性", alias = "Neutral", alias = "unisex")]
    Neutral,
}

impl Gender {
    /// Whether an item tagged `tag` suits someone with this preference.
    /// Neutral on either side matches everything.
    #[must_use]
    pub fn accepts(self, tag: Self) -> bool {
        self == Self::Neutral || tag == Self::Neutral || self == tag
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown gender '{0}'")]
pub struct ParseGenderError(pub String);

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "men" | "男性" => Ok(Self::Male),
            "female" | "women" | "女性" => Ok(Self::Female),
            "neutral" | "unisex" | "中性" => Ok(Self::Neutral),
            other => Err(ParseGenderError(other.to_owned())),
        }
    }
}

/// Inclusive body height range in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct HeightRange {
    pub min_cm: f32,
    pub max_cm: f32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseHeightRangeError {
    #[error("height range '{0}' is not of the form '<min>-<max>cm'")]
    Format(String),
    #[error("height range '{0}' has min above max")]
    Inverted(String),
}

impl HeightRange {
    pub fn new(min_cm: f32, max_cm: f32) -> Result<Self, ParseHeightRangeError> {
        if min_cm > max_cm {
            return Err(ParseHeightRangeError::Inverted(format!("{min_cm}-{max_cm}")));
        }
        Ok(Self { min_cm, max_cm })
    }

    #[must_use]
    pub fn contains(&self, height_cm: f32) -> bool {
        (self.min_cm..=self.max_cm).contains(&height_cm)
    }
}

impl FromStr for HeightRange {
    type Err = ParseHeightRangeError;

    /// Parses the catalog text form, e.g. `150-165cm` or `150~165`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches("cm").trim();
        let (min, max) = trimmed
            .split_once(['-', '~'])
            .ok_or_else(|| ParseHeightRangeError::Format(s.to_owned()))?;
        let parse = |v: &str| {
            v.trim()
                .trim_end_matches("cm")
                .trim()
                .parse::<f32>()
                .map_err(|_| ParseHeightRangeError::Format(s.to_owned()))
        };
        let range = Self::new(parse(min)?, parse(max)?);
        range.map_err(|_| ParseHeightRangeError::Inverted(s.to_owned()))
    }
}

impl fmt::Display for HeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}cm", self.min_cm, self.max_cm)
    }
}

impl<'de> Deserialize<'de> for HeightRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawHeightRange {
            Text(String),
            Bounds {
                #[serde(alias = "min")]
                min_cm: f32,
                #[serde(alias = "max")]
                max_cm: f32,
            },
        }

        match RawHeightRange::deserialize(deserializer)? {
            RawHeightRange::Text(text) => text.parse().map_err(de::Error::custom),
            RawHeightRange::Bounds { min_cm, max_cm } => {
                Self::new(min_cm, max_cm).map_err(de::Error::custom)
            }
        }
    }
}

/// One catalog garment. Read-only to the try-on and recommendation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GarmentItem {
    pub id: String,
    pub name: String,
    #[schema(value_type = String, example = "midi-skirt")]
    pub category: Category,
    #[serde(rename = "gender", alias = "gender_tag")]
    #[schema(value_type = String, example = "female")]
    pub gender_tag: Gender,
    pub height_range: HeightRange,
    #[serde(default, alias = "style", deserialize_with = "string_or_list")]
    pub style_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The catalog stores style either as one free-text string or as a list of tags.
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(tag) if tag.trim().is_empty() => vec![],
        OneOrMany::One(tag) => vec![tag],
        OneOrMany::Many(tags) => tags,
    })
}

/// One coherent outfit: an upper-body and a lower-body item, or a dress alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutfitRecommendation {
    pub items: Vec<GarmentItem>,
    /// Combined style score, present when a style preference was used for ranking.
    pub score: Option<f32>,
}

impl OutfitRecommendation {
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }
}
