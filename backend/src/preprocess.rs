use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader};
use ndarray::Array4;
use shared::{INPUT_CHANNELS, INPUT_SIZE};
use std::io::Cursor;

use crate::error::InferenceError;

// Browsers and curl fall back to this when they cannot tell the type.
const GENERIC_MIME: &str = "application/octet-stream";

/// Validates the declared content type and the sniffed format of an upload.
/// Only JPEG and PNG are accepted.
pub fn check_media_type(declared: Option<&str>, bytes: &[u8]) -> Result<ImageFormat, InferenceError> {
    if let Some(mime) = declared.filter(|m| !m.eq_ignore_ascii_case(GENERIC_MIME)) {
        if !shared::is_accepted_mime(mime) {
            return Err(InferenceError::UnsupportedMediaType(mime.to_string()));
        }
    }

    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => Ok(format),
        Ok(other) => Err(InferenceError::UnsupportedMediaType(
            other.to_mime_type().to_string(),
        )),
        Err(_) => Err(InferenceError::Decode("unrecognised image data".to_string())),
    }
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, InferenceError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| InferenceError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| InferenceError::Decode(e.to_string()))
}

/// Turns a decoded image into the model input: RGB, 224x224 bilinear,
/// scaled to [0,1], NHWC with a batch of one.
pub fn to_input_tensor(image: &DynamicImage) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let resized = imageops::resize(
        &rgb,
        INPUT_SIZE as u32,
        INPUT_SIZE as u32,
        FilterType::Triangle,
    );

    Array4::from_shape_fn((1, INPUT_SIZE, INPUT_SIZE, INPUT_CHANNELS), |(_, y, x, c)| {
        f32::from(resized.get_pixel(x as u32, y as u32)[c]) / 255.0
    })
}

pub fn preprocess(bytes: &[u8]) -> Result<Array4<f32>, InferenceError> {
    let image = decode(bytes)?;
    Ok(to_input_tensor(&image))
}
