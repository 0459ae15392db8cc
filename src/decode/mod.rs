//! Pixel and EXIF extraction for downloaded images.

mod metadata;

pub use metadata::ExifFields;

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use tracing::trace;

use crate::error::DecodeError;
use crate::model::{PaletteColor, Rgb, UNKNOWN};

/// Longest edge of the preview handed to scorers.
const PREVIEW_EDGE: u32 = 512;
/// Longest edge of the thumbnail averaged for the dominant colour.
const COLOR_SAMPLE_EDGE: u32 = 64;

#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Display width, after applying the EXIF orientation.
    pub width: u32,
    /// Display height, after applying the EXIF orientation.
    pub height: u32,
    pub exif: ExifFields,
    pub mean_rgb: Rgb,
    pub preview: DynamicImage,
}

/// Decodes `bytes`, failing on formats the `image` crate does not know.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let img = image::load_from_memory(bytes)?;
    let exif = ExifFields::from_bytes(bytes);

    let (raw_width, raw_height) = img.dimensions();
    let (width, height) = if exif.swaps_dimensions() {
        (raw_height, raw_width)
    } else {
        (raw_width, raw_height)
    };

    let mean_rgb = mean_color(&img);
    let preview = img.thumbnail(PREVIEW_EDGE, PREVIEW_EDGE);
    trace!(width, height, ?mean_rgb, "decoded image");

    Ok(DecodedImage {
        width,
        height,
        exif,
        mean_rgb,
        preview,
    })
}

fn mean_color(img: &DynamicImage) -> Rgb {
    let sample = img.thumbnail(COLOR_SAMPLE_EDGE, COLOR_SAMPLE_EDGE).to_rgb8();
    let count = sample.pixels().len() as u64;
    if count == 0 {
        return PaletteColor::Neutral.rgb();
    }

    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for pixel in sample.pixels() {
        r += pixel[0] as u64;
        g += pixel[1] as u64;
        b += pixel[2] as u64;
    }
    Rgb::new((r / count) as u8, (g / count) as u8, (b / count) as u8)
}

impl DecodedImage {
    pub fn palette_color(&self) -> PaletteColor {
        PaletteColor::nearest(self.mean_rgb)
    }

    /// `Make Model`, dropping the make when the model already carries it.
    pub fn camera(&self) -> String {
        let make = self.exif.make.as_deref().map(str::trim).unwrap_or("");
        let model = self.exif.model.as_deref().map(str::trim).unwrap_or("");
        match (make.is_empty(), model.is_empty()) {
            (true, true) => UNKNOWN.to_string(),
            (false, true) => make.to_string(),
            (true, false) => model.to_string(),
            (false, false) => {
                let brand = make.split_whitespace().next().unwrap_or(make);
                if model.to_lowercase().starts_with(&brand.to_lowercase()) {
                    model.to_string()
                } else {
                    format!("{make} {model}")
                }
            }
        }
    }

    pub fn lens(&self) -> String {
        self.exif
            .lens_model
            .as_deref()
            .or(self.exif.lens_make.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    }

    /// Encodes the preview as RGB in `format` for upload to a scorer.
    pub fn encode_preview(&self, format: ImageFormat) -> Result<Vec<u8>, DecodeError> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(self.preview.to_rgb8())
            .write_to(&mut buf, format)
            .map_err(|e| DecodeError::preview_encode(e.to_string()))?;
        Ok(buf.into_inner())
    }
}
