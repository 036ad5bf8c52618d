pub const REJECT_REASON: &str = "Only one person may be in the photo.";

/// Upload size that is not the 3:4 the synthesis model wants.
pub const PHOTO_WIDTH: u32 = 300;
pub const PHOTO_HEIGHT: u32 = 500;

pub const CATALOG: &str = r#"[
    {"id": "1", "name": "White linen shirt", "category": "upper-body", "gender": "female",
     "height_range": "150-170cm", "style": "casual summer"},
    {"id": "2", "name": "Pleated skirt", "category": "midi-skirt", "gender": "female",
     "height_range": "155-175cm", "style_tags": ["formal", "office"], "image_url": "/images/skirt.png"},
    {"id": "3", "name": "Black evening dress", "category": "dress", "gender": "female",
     "height_range": {"min_cm": 160, "max_cm": 180}, "style_tags": ["formal", "evening"]},
    {"id": "10", "name": "Denim jacket", "category": "upper-body", "gender": "male",
     "height_range": "170-190", "style": "casual"},
    {"id": "11", "name": "Chinos", "category": "full-pants", "gender": "unisex",
     "height_range": "165-195", "style": "casual"},
    {"id": "20", "name": "Ski boots", "category": "shoes", "gender": "unisex",
     "height_range": "100-200"}
]"#;
