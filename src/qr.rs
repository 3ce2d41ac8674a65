use crate::assets::data_uri;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

const MODULE_PIXELS: u32 = 10;

/// Render `payload` as a black-on-white PNG QR code data URI.
pub fn generate_data_uri(payload: &str) -> Result<String> {
    let png = generate_png(payload)?;
    Ok(data_uri("image/png", &png))
}

pub fn generate_png(payload: &str) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)
        .with_context(|| format!("Failed to encode QR payload of {} bytes", payload.len()))?;

    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("Failed to write QR code PNG")?;

    Ok(png)
}
