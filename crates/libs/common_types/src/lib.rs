#![deny(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

mod garment;
mod image_asset;
mod profile;

pub use garment::*;
pub use image_asset::*;
pub use profile::*;
