#![deny(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc
)]

//! # Aspect Normalizer
//!
//! Pads photos to the aspect ratio an image-synthesis model expects, and crops the
//! padding off again afterwards.
//!
//! Every padded image comes with a [`PaddingTransform`] describing exactly where the
//! original pixels sit inside the padded frame. Cropping with that transform gives back
//! the original image pixel for pixel, as long as the padded frame was not resampled.
//!
//! ## Padding rule
//!
//! - Only one axis is ever padded: width when the photo is too narrow, height when it is
//!   too wide.
//! - The padded extent is the rounded ideal extent (`height * ratio` or `width / ratio`),
//!   never smaller than the source.
//! - The padding is split evenly. An odd remainder pixel goes to the right or bottom edge.
//! - Photos within the tolerance of the target ratio are left alone (all-zero padding).
//!
//! ## Entry Points
//!
//! - [`normalize`] / [`denormalize`]: the pad and its inverse.
//! - [`fit_to_padded`]: resamples a synthesized frame to the padded size before cropping,
//!   for services that answer at their own resolution.

mod error;
mod padding;
mod resample;

pub use error::NormalizeError;
pub use padding::*;
pub use resample::{fit_to_padded, resize_rgb};
