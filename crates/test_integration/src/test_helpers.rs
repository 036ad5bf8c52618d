use crate::test_constants::{PHOTO_HEIGHT, PHOTO_WIDTH};
use color_eyre::Result;
use image::{ImageFormat, Rgb, RgbImage};
use reqwest::multipart::{Form, Part};
use std::io::Cursor;

/// PNG of a plain colored frame.
pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(width, height, Rgb(color))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn user_photo() -> Result<Vec<u8>> {
    png_bytes(PHOTO_WIDTH, PHOTO_HEIGHT, [200, 150, 120])
}

pub fn photo_form(photo: Vec<u8>) -> Result<Form> {
    let part = Part::bytes(photo)
        .file_name("me.png")
        .mime_str("image/png")?;
    Ok(Form::new().part("file", part))
}

pub fn try_on_form(photo: Vec<u8>, clothes_id: &str) -> Result<Form> {
    Ok(photo_form(photo)?.text("clothes_id", clothes_id.to_owned()))
}

/// Dimensions of an encoded image in a response body.
pub fn decoded_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let image = image::load_from_memory(bytes)?;
    Ok((image.width(), image.height()))
}

pub fn ids(items: &serde_json::Value) -> Vec<String> {
    items
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
