use crate::region::RegionHint;
use crate::synthesis::SynthesisRequest;
use aspect_normalizer::{NormalizeError, resize_rgb};
use common_types::ImageAsset;
use image::Rgb;

/// Garment opacity over the person photo.
const GARMENT_ALPHA: f32 = 0.85;
/// Garment width relative to the frame width.
const WIDTH_SHARE: f32 = 0.5;

/// Band of the frame (top, bottom as fractions) the garment is pasted into.
/// Narrower than the synthesis mask band so the paste sits on the body.
const fn placement_band(region: RegionHint) -> (f32, f32) {
    match region {
        RegionHint::UpperBody => (0.18, 0.52),
        RegionHint::LowerHalf => (0.48, 0.92),
        RegionHint::FullBody => (0.18, 0.9),
    }
}

/// Local stand-in for a synthesized frame: the garment image scaled into its
/// body band and blended over the person. Same dimensions as `request.person`.
pub fn compose_placeholder(request: &SynthesisRequest) -> Result<ImageAsset, NormalizeError> {
    let mut canvas = request.person.pixels().clone();
    let (frame_w, frame_h) = canvas.dimensions();
    let (band_top, band_bottom) = placement_band(request.region);

    let max_w = ((frame_w as f32 * WIDTH_SHARE).round() as u32).max(1);
    let max_h = (((band_bottom - band_top) * frame_h as f32).round() as u32).max(1);
    let (garment_w, garment_h) = request.garment.dimensions();
    let scale = (max_w as f32 / garment_w as f32).min(max_h as f32 / garment_h as f32);
    let w = ((garment_w as f32 * scale).round() as u32).clamp(1, frame_w);
    let h = ((garment_h as f32 * scale).round() as u32).clamp(1, frame_h);
    let garment = resize_rgb(request.garment.pixels(), w, h)?;

    let x0 = (frame_w - w) / 2;
    let y0 = ((band_top * frame_h as f32).round() as u32).min(frame_h - h);
    for (x, y, src) in garment.enumerate_pixels() {
        let dst = canvas.get_pixel_mut(x0 + x, y0 + y);
        *dst = blend(*dst, *src);
    }

    Ok(ImageAsset::from_rgb(canvas, request.person.format())?)
}

fn blend(base: Rgb<u8>, top: Rgb<u8>) -> Rgb<u8> {
    let mix = |b: u8, t: u8| {
        (f32::from(t) * GARMENT_ALPHA + f32::from(b) * (1.0 - GARMENT_ALPHA)).round() as u8
    };
    Rgb([
        mix(base[0], top[0]),
        mix(base[1], top[1]),
        mix(base[2], top[2]),
    ])
}
